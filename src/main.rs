//! Flipbook CLI (for inspecting a store outside the browser)
//! The main interface is through WASM bindings.
//!
//! Usage: flipbook <store.json> [width height]

use flipbook::{Book, BookConfig, ContentStore, GridMeasurer, Slide, Viewport};
use std::process::ExitCode;

// Roughly a 16px serif: 8px per character, 24px per row
const CHAR_WIDTH: f32 = 8.0;
const LINE_HEIGHT: f32 = 24.0;

fn parse_size(args: &[String]) -> Option<Viewport> {
    match args {
        [width, height] => Some(Viewport::new(width.parse().ok()?, height.parse().ok()?)),
        _ => None,
    }
}

fn run(path: &str, viewport: Viewport) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let store = ContentStore::from_json(&json)?;

    let config = BookConfig {
        initial_viewport: viewport,
        ..BookConfig::default()
    };
    let mut book = Book::with_store(config, store);
    let mut measurer = GridMeasurer::new(CHAR_WIDTH, LINE_HEIGHT);
    book.recompute(&mut measurer)?;

    for slide in book.slides() {
        match slide {
            Slide::ChapterDivider {
                chapter_name,
                topic_count,
                ..
            } => println!("{:<12} {} ({} topics)", slide.key(), chapter_name, topic_count),
            Slide::ContentPage {
                topic_name,
                page_index,
                page_count,
                kind,
                ..
            } => println!(
                "{:<12} {} [{}/{}] {:?}",
                slide.key(),
                topic_name,
                page_index,
                page_count,
                kind
            ),
            _ => println!("{}", slide.key()),
        }
    }

    println!();
    println!(
        "{} chapters, {} topics, {} pages",
        book.store().chapter_count(),
        book.store().topic_count(),
        book.assembly().page_count()
    );
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("usage: flipbook <store.json> [width height]");
        return ExitCode::FAILURE;
    };

    let viewport = match &args[1..] {
        [] => Viewport::default(),
        rest => match parse_size(rest) {
            Some(viewport) => viewport,
            None => {
                eprintln!("width and height must be numbers");
                return ExitCode::FAILURE;
            }
        },
    };

    match run(path, viewport) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
