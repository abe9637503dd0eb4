use day7::sum_of_small_directories;

use std::io::{self, BufRead};

use anyhow::Result;

fn main() -> Result<()> {
    let stdin = io::stdin();

    let total = sum_of_small_directories(stdin.lock().lines().filter_map(|s| s.ok()), 100000)?;

    println!("{total}");

    Ok(())
}
