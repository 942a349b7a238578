//! Anonymous display handles ("yakker" names): emoji + adjective +
//! animal, with the emoji matched to the animal.

use rand::seq::IndexedRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Happy", "Lucky", "Sunny", "Purple", "Orange", "Mystic", "Silent", "Brave", "Calm", "Wild",
    "Cosmic", "Swift", "Jolly", "Clever",
];

const ANIMALS: &[&str] = &[
    "Penguin", "Fox", "Bear", "Eagle", "Dolphin", "Tiger", "Panda", "Wolf", "Owl", "Hawk",
    "Koala", "Lion", "Otter", "Badger",
];

const EMOJIS: &[&str] = &[
    "🐧", "🦊", "🐻", "🦅", "🐬", "🐯", "🐼", "🐺", "🦉", "🦅", "🐨", "🦁", "🦦", "🦡",
];

/// Generates a fresh anonymous handle, e.g. "🦊 Mystic Fox".
pub fn generate_handle() -> String {
    let mut rng = rand::rng();
    generate_handle_with(&mut rng)
}

pub fn generate_handle_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Quiet");
    let index = rng.random_range(0..ANIMALS.len());
    format!("{} {} {}", EMOJIS[index], adjective, ANIMALS[index])
}
