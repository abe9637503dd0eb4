use std::{cell::Cell, collections::BTreeMap, fmt};

use anyhow::{Context, Result};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::char,
    combinator::{map, map_res, value},
    error::ParseError,
    sequence::{preceded, separated_pair},
    IResult,
};
use thiserror::Error;
use util::{parse_nice, parse_number, Span};

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Malformed transcript line: {0}")]
    MalformedLine(String),

    #[error("Unable to go up from the root directory!")]
    CdAboveRoot,

    #[error("Unable to cd into {0}: it is a file!")]
    CdIntoFile(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    CdRoot,
    CdUp,
    Cd(String),
    Ls,
    Dir(String),
    File { size: usize, name: String },
}

fn name<'a, E>(i: Span<'a>) -> IResult<Span<'a>, String, E>
where
    E: ParseError<Span<'a>>,
{
    map(is_not(" "), |s: Span<'a>| s.fragment().to_string())(i)
}

fn file_size<'a, E>(i: Span<'a>) -> IResult<Span<'a>, usize, E>
where
    E: ParseError<Span<'a>> + nom::error::FromExternalError<Span<'a>, anyhow::Error>,
{
    map_res(parse_number, |n| {
        usize::try_from(n).map_err(anyhow::Error::from)
    })(i)
}

fn directive<'a, E>(i: Span<'a>) -> IResult<Span<'a>, Directive, E>
where
    E: ParseError<Span<'a>> + nom::error::FromExternalError<Span<'a>, anyhow::Error>,
{
    alt((
        preceded(
            tag("$ cd "),
            alt((
                value(Directive::CdRoot, tag("/")),
                value(Directive::CdUp, tag("..")),
                map(name, Directive::Cd),
            )),
        ),
        value(Directive::Ls, tag("$ ls")),
        map(preceded(tag("dir "), name), Directive::Dir),
        map(separated_pair(file_size, char(' '), name), |(size, name)| {
            Directive::File { size, name }
        }),
    ))(i)
}

pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
enum Node {
    File {
        name: String,
        size: usize,
    },
    Dir {
        name: String,
        parent: Option<NodeId>,
        children: BTreeMap<String, NodeId>,
        // Filled in on first size query; the tree never changes afterwards.
        cached_size: Cell<Option<usize>>,
    },
}

impl Node {
    fn new_dir(name: String, parent: Option<NodeId>) -> Self {
        Self::Dir {
            name,
            parent,
            children: BTreeMap::new(),
            cached_size: Cell::new(None),
        }
    }

    fn new_file(name: String, size: usize) -> Self {
        Self::File { name, size }
    }

    fn name(&self) -> &str {
        match self {
            Node::File { name, .. } => name,
            Node::Dir { name, .. } => name,
        }
    }
}

// Arena-backed directory tree; nodes are owned by the arena, parents are
// back-references by index.
#[derive(Debug)]
pub struct Filesystem {
    nodes: Vec<Node>,
}

impl Filesystem {
    pub fn parse(input: impl Iterator<Item = String>) -> Result<Self, TranscriptError> {
        let mut fs = Self {
            nodes: vec![Node::new_dir("/".to_string(), None)],
        };
        let mut cursor = ROOT;

        for l in input {
            let d = parse_nice(l.as_str(), directive)
                .ok_or_else(|| TranscriptError::MalformedLine(l.clone()))?;

            match d {
                Directive::CdRoot => cursor = ROOT,
                Directive::CdUp => {
                    cursor = fs.parent_of(cursor).ok_or(TranscriptError::CdAboveRoot)?;
                }
                Directive::Cd(dir_name) => {
                    cursor = match fs.child_of(cursor, &dir_name) {
                        Some(id) if matches!(fs.nodes[id], Node::Dir { .. }) => id,
                        Some(_) => return Err(TranscriptError::CdIntoFile(dir_name)),
                        None => fs.insert(cursor, Node::new_dir(dir_name, Some(cursor))),
                    };
                }
                Directive::Ls => {}
                Directive::Dir(dir_name) => {
                    fs.insert(cursor, Node::new_dir(dir_name, Some(cursor)));
                }
                Directive::File { size, name } => {
                    fs.insert(cursor, Node::new_file(name, size));
                }
            }
        }

        Ok(fs)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        match &self.nodes[id] {
            Node::Dir { parent, .. } => *parent,
            Node::File { .. } => None,
        }
    }

    fn child_of(&self, id: NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes[id] {
            Node::Dir { children, .. } => children.get(name).copied(),
            Node::File { .. } => None,
        }
    }

    // Re-listing a directory must not replace what is already there.
    fn insert(&mut self, parent: NodeId, node: Node) -> NodeId {
        if let Some(existing) = self.child_of(parent, node.name()) {
            return existing;
        }

        let name = node.name().to_string();
        let id = self.nodes.len();
        self.nodes.push(node);
        if let Node::Dir { children, .. } = &mut self.nodes[parent] {
            children.insert(name, id);
        }

        id
    }

    pub fn size(&self, id: NodeId) -> usize {
        match &self.nodes[id] {
            Node::File { size, .. } => *size,
            Node::Dir {
                children,
                cached_size,
                ..
            } => {
                if let Some(size) = cached_size.get() {
                    return size;
                }
                let size = children.values().map(|&child| self.size(child)).sum();
                cached_size.set(Some(size));
                size
            }
        }
    }

    pub fn total_size(&self) -> usize {
        self.size(ROOT)
    }

    // All directories as (name, size) pairs, root first, in pre-order.
    pub fn directory_sizes(&self) -> Vec<(&str, usize)> {
        let mut sizes = Vec::new();
        self.collect_directory_sizes(ROOT, &mut sizes);
        sizes
    }

    fn collect_directory_sizes<'a>(&'a self, id: NodeId, out: &mut Vec<(&'a str, usize)>) {
        if let Node::Dir { name, children, .. } = &self.nodes[id] {
            out.push((name.as_str(), self.size(id)));
            for &child in children.values() {
                self.collect_directory_sizes(child, out);
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match &self.nodes[id] {
            Node::File { name, size } => writeln!(f, "{pad}- {name} (file, size={size})"),
            Node::Dir { name, children, .. } => {
                writeln!(f, "{pad}- {name} (dir)")?;
                children
                    .values()
                    .try_for_each(|&child| self.render(f, child, depth + 1))
            }
        }
    }
}

impl fmt::Display for Filesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, ROOT, 0)
    }
}

pub fn sum_of_small_directories(
    input: impl Iterator<Item = String>,
    limit: usize,
) -> Result<usize> {
    let fs = Filesystem::parse(input)?;

    Ok(fs
        .directory_sizes()
        .into_iter()
        .filter_map(|(_, size)| (size <= limit).then_some(size))
        .sum())
}

pub fn size_to_delete(
    input: impl Iterator<Item = String>,
    capacity: usize,
    required_free: usize,
) -> Result<usize> {
    let fs = Filesystem::parse(input)?;

    let available = capacity
        .checked_sub(fs.total_size())
        .context("More space used than the disk holds!")?;
    let to_free = required_free
        .checked_sub(available)
        .context("There is already enough free space!")?;

    fs.directory_sizes()
        .into_iter()
        .filter_map(|(_, size)| (size >= to_free).then_some(size))
        .min()
        .context("No directory is big enough to free the required space!")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_INPUT: &str = include_str!("../data/test_input");

    fn test_lines() -> impl Iterator<Item = String> {
        TEST_INPUT.lines().map(|l| l.to_string())
    }

    #[test]
    fn part1() {
        let res = sum_of_small_directories(test_lines(), 100000);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 95437);
    }

    #[test]
    fn part2() {
        let res = size_to_delete(test_lines(), 70000000, 30000000);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), 24933642);
    }

    #[test]
    fn root_size_is_the_total_of_all_files() {
        let file_sizes = [
            14848514, 8504156, 29116, 2557, 62596, 584, 4060174, 8033020, 5626152, 7214296,
        ];

        let fs = Filesystem::parse(test_lines()).unwrap();
        assert_eq!(fs.total_size(), file_sizes.iter().sum::<usize>());
        assert_eq!(fs.total_size(), 48381165);
    }

    #[test]
    fn directory_sizes_match_the_worked_example() {
        let fs = Filesystem::parse(test_lines()).unwrap();
        let sizes = fs.directory_sizes();

        assert_eq!(sizes.first(), Some(&("/", 48381165)));
        assert!(sizes.contains(&("a", 94853)));
        assert!(sizes.contains(&("e", 584)));
        assert!(sizes.contains(&("d", 24933642)));
        assert_eq!(sizes.len(), 4);
    }

    #[test]
    fn size_queries_are_idempotent() {
        let fs = Filesystem::parse(test_lines()).unwrap();
        let first = fs.total_size();
        assert_eq!(fs.total_size(), first);
        assert_eq!(fs.directory_sizes(), fs.directory_sizes());
    }

    #[test]
    fn rendering_reproduces_the_tree_shape() {
        let expected = "\
- / (dir)
  - a (dir)
    - e (dir)
      - i (file, size=584)
    - f (file, size=29116)
    - g (file, size=2557)
    - h.lst (file, size=62596)
  - b.txt (file, size=14848514)
  - c.dat (file, size=8504156)
  - d (dir)
    - d.ext (file, size=5626152)
    - d.log (file, size=8033020)
    - j (file, size=4060174)
    - k (file, size=7214296)
";

        let fs = Filesystem::parse(test_lines()).unwrap();
        assert_eq!(fs.to_string(), expected);

        let reparsed = Filesystem::parse(test_lines()).unwrap();
        assert_eq!(reparsed.to_string(), fs.to_string());
    }

    #[test]
    fn relisting_a_directory_is_idempotent() {
        let input = "$ cd /
$ ls
dir a
100 b
$ ls
dir a
100 b";

        let fs = Filesystem::parse(input.lines().map(|l| l.to_string())).unwrap();
        assert_eq!(fs.total_size(), 100);
        assert_eq!(fs.directory_sizes().len(), 2);
    }

    #[test]
    fn cd_above_root_fails() {
        let input = "$ cd /
$ cd ..";

        let res = Filesystem::parse(input.lines().map(|l| l.to_string()));
        assert!(matches!(res, Err(TranscriptError::CdAboveRoot)));
    }

    #[test]
    fn cd_into_a_file_fails() {
        let input = "$ cd /
$ ls
123 x
$ cd x";

        let res = Filesystem::parse(input.lines().map(|l| l.to_string()));
        assert!(matches!(res, Err(TranscriptError::CdIntoFile(name)) if name == "x"));
    }

    #[test]
    fn malformed_line_fails() {
        let input = "$ cd /
$ blink";

        let res = Filesystem::parse(input.lines().map(|l| l.to_string()));
        assert!(matches!(res, Err(TranscriptError::MalformedLine(_))));
    }

    #[test]
    fn already_enough_free_space_fails() {
        let res = size_to_delete(test_lines(), 70000000, 10000000);
        assert!(res.is_err());
    }
}
