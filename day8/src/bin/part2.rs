use day8::best_scenic_score;

use anyhow::Result;
use util::read_input_as_string;

fn main() -> Result<()> {
    let score = best_scenic_score(read_input_as_string()?.as_str())?;

    println!("{score}");

    Ok(())
}
