//! Inspire command - suggest a prompt to get started with

use anyhow::Result;
use rand::seq::SliceRandom;

use crate::output;

const IMAGE_PROMPTS: [&str; 10] = [
    "A majestic lion with a crown of stars, photorealistic, 4k",
    "Floating castle in a sea of clouds, detailed, fantasy art",
    "Neon-lit cyberpunk alleyway in the rain, cinematic lighting",
    "Ancient tree of life with glowing roots, mystical, vibrant colors",
    "A friendly robot serving tea in a tranquil zen garden, high detail",
    "A surreal desert landscape with two suns and purple sand",
    "Underwater city made of crystal, bioluminescent creatures swimming by",
    "A steampunk library with flying books and intricate clockwork",
    "Portrait of a warrior queen made of liquid metal, abstract",
    "A tiny, fluffy creature discovering a giant, glowing mushroom forest",
];

const THUMBNAIL_PROMPTS: [&str; 8] = [
    "A gamer with a shocked expression, an exploding spaceship in the background, vibrant colors, text 'INSANE LUCK!'",
    "A YouTuber unboxing a mysterious glowing box, cinematic lighting, dramatic, text 'WHAT'S INSIDE?!'",
    "Side-by-side comparison of a cheap vs expensive gadget, clear labels, text 'Is it Worth It?'",
    "A delicious-looking pizza with melting cheese, close-up shot, food photography, text 'Ultimate Pizza Recipe'",
    "A travel vlogger standing on a mountain peak at sunrise, epic landscape, text 'I CLIMBED IT!'",
    "A cartoon scientist mixing colorful potions that are bubbling over, fun and energetic, text 'CRAZY EXPERIMENTS!'",
    "A stylized drawing of a brain with glowing connections, dark background, text 'LEARN FASTER'",
    "A person meditating in a beautiful, serene landscape, calm and peaceful, text 'Find Your Peace'",
];

pub fn run(thumbnails: bool) -> Result<()> {
    let pool: &[&str] = if thumbnails {
        &THUMBNAIL_PROMPTS
    } else {
        &IMAGE_PROMPTS
    };

    let mut rng = rand::thread_rng();
    let prompt = pool.choose(&mut rng).copied().unwrap_or(pool[0]);

    println!("{}", prompt);
    let command = if thumbnails { "thumbnail" } else { "generate" };
    output::info(&format!("Run it with: ez {} \"{}\"", command, prompt));

    Ok(())
}
