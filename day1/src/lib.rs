use anyhow::{Context, Result};
use itertools::Itertools;

// Inventories are separated by blank lines; a trailing inventory without a
// final blank line still counts. Equal totals are all kept.
fn find_totals(input: impl Iterator<Item = impl Into<String>>) -> Result<Vec<i64>> {
    let mut totals = Vec::new();
    let mut current: Option<i64> = None;
    for line in input {
        let line: String = line.into();
        if line.trim().is_empty() {
            if let Some(total) = current.take() {
                totals.push(total);
            }
        } else {
            let calories: i64 = line
                .trim()
                .parse()
                .with_context(|| format!("Not a calorie count: {line}"))?;
            *current.get_or_insert(0) += calories;
        }
    }
    if let Some(total) = current {
        totals.push(total);
    }

    Ok(totals)
}

pub fn biggest_total(input: impl Iterator<Item = impl Into<String>>) -> Result<i64> {
    find_totals(input)?
        .into_iter()
        .max()
        .context("No inventories in the input!")
}

pub fn biggest_three_total(input: impl Iterator<Item = impl Into<String>>) -> Result<i64> {
    Ok(find_totals(input)?
        .into_iter()
        .sorted_unstable()
        .rev()
        .take(3)
        .sum())
}
