use rift_switcher::app::{Variant, launch};

fn main() -> anyhow::Result<()> { launch(Variant::Thumbnails) }
