use std::{
    io::{self, BufRead},
    str::FromStr,
};

use anyhow::Result;
use nom::{
    character::complete::{char, digit1},
    combinator::{map_res, opt, recognize},
    error::ParseError,
    sequence::tuple,
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{BaseErrorKind, ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};

// Thanks to FasterThanLime! https://fasterthanli.me/series/advent-of-code-2022/part-11

pub type Span<'a> = LocatedSpan<&'a str>;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input")]
struct BadInput<'a> {
    #[source_code]
    src: &'a str,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: String,
}

pub fn parse_number<'a, E>(i: Span<'a>) -> IResult<Span<'a>, i64, E>
where
    E: ParseError<Span<'a>> + nom::error::FromExternalError<Span<'a>, anyhow::Error>,
{
    map_res(recognize(tuple((opt(char('-')), digit1))), |i: Span<'a>| {
        FromStr::from_str(i.fragment()).map_err(anyhow::Error::msg)
    })(i)
}

type BaseKind<'a> = BaseErrorKind<&'a str, Box<dyn std::error::Error + Send + Sync>>;

// Stacks keep their innermost error in `base`; for alternations the first
// branch's base is as good a location as any.
fn innermost_base<'a, 'b>(e: &'b ErrorTree<Span<'a>>) -> Option<(&'b Span<'a>, &'b BaseKind<'a>)> {
    match e {
        GenericErrorTree::Base { location, kind } => Some((location, kind)),
        GenericErrorTree::Stack { base, .. } => innermost_base(base),
        GenericErrorTree::Alt(alternatives) => alternatives.iter().find_map(innermost_base),
    }
}

pub fn parse_nice<'a, T, F>(l: &'a str, parse_fun: F) -> Option<T>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line_span = Span::new(l);
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(line_span);
    match line {
        Ok(line) => Some(line),
        Err(e) => {
            if let Some((location, kind)) = innermost_base(&e) {
                let offset = location.location_offset().into();
                let err = BadInput {
                    src: l,
                    bad_bit: miette::SourceSpan::new(offset, 0.into()),
                    kind: kind.to_string(),
                };
                let mut s = String::new();
                miette::GraphicalReportHandler::new()
                    .render_report(&mut s, &err)
                    .unwrap();
                println!("{s}");
            }
            None
        }
    }
}

pub fn read_input_as_string() -> Result<String> {
    let stdin = io::stdin();

    let lines = stdin
        .lock()
        .lines()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_negative() {
        let res = parse_nice("-42", parse_number);
        assert_eq!(res, Some(-42));
    }

    #[test]
    fn parse_number_rejects_trailing_garbage() {
        let res = parse_nice("12ab", parse_number);
        assert_eq!(res, None);
    }
}
