use day8::count_visible_trees;

use anyhow::Result;
use util::read_input_as_string;

fn main() -> Result<()> {
    let visible = count_visible_trees(read_input_as_string()?.as_str())?;

    println!("{visible}");

    Ok(())
}
