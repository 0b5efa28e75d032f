//! `arbor map` command implementation.

use std::path::Path;

use arbor::render::render_map;
use arbor::Analyzer;

use super::display::print_json;

/// Run the map command.
pub fn run(analyzer: &Analyzer, dir: &Path, json: bool) -> arbor::Result<()> {
    let map = analyzer.map_directory(dir)?;
    if json {
        return print_json(&map);
    }
    print!("{}", render_map(&map));
    Ok(())
}
