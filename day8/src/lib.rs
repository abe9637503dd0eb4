use std::str::FromStr;

use anyhow::{Context, Result};
use itertools::{iproduct, Itertools};
use num::range_step_inclusive;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridParseError {
    #[error("Unrecognized height character: {0}")]
    BadHeight(char),

    #[error("Grid row lengths are not all equal!")]
    UnevenRows,

    #[error("Empty grid!")]
    Empty,
}

#[derive(Debug, Clone)]
struct Grid {
    heights: Vec<Vec<u32>>,
}

impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let heights = s
            .lines()
            .map(|l| {
                l.chars()
                    .map(|c| c.to_digit(10).ok_or(GridParseError::BadHeight(c)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        if heights.is_empty() || heights[0].is_empty() {
            return Err(GridParseError::Empty);
        }
        heights
            .iter()
            .map(|row| row.len())
            .all_equal()
            .then_some(())
            .ok_or(GridParseError::UnevenRows)?;

        Ok(Self { heights })
    }
}

const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

impl Grid {
    fn rows(&self) -> usize {
        self.heights.len()
    }

    fn cols(&self) -> usize {
        self.heights[0].len()
    }

    // Walks every cell four times, once per edge direction, resetting
    // `new_line` at the start of each row or column sweep.
    fn sweep_directions<F>(&self, mut func: F)
    where
        F: FnMut(usize, usize, u32, bool),
    {
        enum OuterI {
            Rows,
            Cols,
        }

        let row_max = self.rows() as i32 - 1;
        let col_max = self.cols() as i32 - 1;

        let specs = vec![
            ((0, col_max, 1i32), OuterI::Rows),
            ((col_max, 0, -1), OuterI::Rows),
            ((0, row_max, 1), OuterI::Cols),
            ((row_max, 0, -1), OuterI::Cols),
        ];

        for ((inner_start, inner_stop, inner_step), outer_which) in specs {
            let outer_count = match outer_which {
                OuterI::Rows => self.rows(),
                OuterI::Cols => self.cols(),
            };
            for outer in 0..outer_count {
                let mut new_line = true;
                for inner in range_step_inclusive(inner_start, inner_stop, inner_step) {
                    let (row, col) = match outer_which {
                        OuterI::Rows => (outer, inner as usize),
                        OuterI::Cols => (inner as usize, outer),
                    };
                    func(row, col, self.heights[row][col], new_line);
                    new_line = false;
                }
            }
        }
    }

    fn count_visible(&self) -> usize {
        let mut visible = vec![vec![false; self.cols()]; self.rows()];
        let mut tallest: Option<u32> = None;

        self.sweep_directions(|row, col, height, new_line| {
            if new_line {
                tallest = None;
            }
            if tallest.map_or(true, |t| height > t) {
                tallest = Some(height);
                visible[row][col] = true;
            }
        });

        visible.iter().flatten().filter(|&&v| v).count()
    }

    fn viewing_distance(&self, row: usize, col: usize, (d_row, d_col): (i32, i32)) -> usize {
        let own = self.heights[row][col];
        let mut distance = 0;
        let (mut r, mut c) = (row as i32 + d_row, col as i32 + d_col);

        while r >= 0 && c >= 0 && (r as usize) < self.rows() && (c as usize) < self.cols() {
            distance += 1;
            if self.heights[r as usize][c as usize] >= own {
                break;
            }
            r += d_row;
            c += d_col;
        }

        distance
    }

    fn scenic_score(&self, row: usize, col: usize) -> usize {
        DIRECTIONS
            .iter()
            .map(|&d| self.viewing_distance(row, col, d))
            .product()
    }

    fn best_scenic_score(&self) -> Option<usize> {
        iproduct!(0..self.rows(), 0..self.cols())
            .map(|(row, col)| self.scenic_score(row, col))
            .max()
    }
}

pub fn count_visible_trees(input: &str) -> Result<usize> {
    let grid: Grid = input.parse()?;

    Ok(grid.count_visible())
}

pub fn best_scenic_score(input: &str) -> Result<usize> {
    let grid: Grid = input.parse()?;

    grid.best_scenic_score().context("No scenic scores!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TEST_INPUT: &str = include_str!("../data/test_input");

    #[test]
    fn part1() {
        let res = count_visible_trees(TEST_INPUT);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 21);
    }

    #[test]
    fn part2() {
        let res = best_scenic_score(TEST_INPUT);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 8);
    }

    #[rstest]
    #[case(1, 2, 4)]
    #[case(3, 2, 8)]
    fn scenic_score_of_example_cells(
        #[case] row: usize,
        #[case] col: usize,
        #[case] expected: usize,
    ) {
        let grid: Grid = TEST_INPUT.parse().unwrap();
        assert_eq!(grid.scenic_score(row, col), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0, 4)]
    #[case(4, 0)]
    #[case(4, 4)]
    fn edge_cells_score_zero(#[case] row: usize, #[case] col: usize) {
        let grid: Grid = TEST_INPUT.parse().unwrap();
        assert_eq!(grid.scenic_score(row, col), 0);
    }

    #[test]
    fn all_trees_of_a_rectangular_grid_are_visible_when_rising() {
        let res = count_visible_trees("12345\n23456");
        assert_eq!(res.unwrap(), 10);
    }

    #[test]
    fn uneven_rows_fail() {
        let res = "303\n25\n653".parse::<Grid>();
        assert!(matches!(res, Err(GridParseError::UnevenRows)));
    }

    #[test]
    fn bad_height_character_fails() {
        let res = "303\n2a5\n653".parse::<Grid>();
        assert!(matches!(res, Err(GridParseError::BadHeight('a'))));
    }

    #[test]
    fn empty_grid_fails() {
        let res = "".parse::<Grid>();
        assert!(matches!(res, Err(GridParseError::Empty)));
    }
}
