use day1::biggest_total;

use std::io::{self, BufRead};

use anyhow::Result;

fn main() -> Result<()> {
    let stdin = io::stdin();

    let total = biggest_total(stdin.lock().lines().filter_map(|s| s.ok()))?;

    println!("{total}");

    Ok(())
}
