// Color string parsing and hex formatting

use anyhow::Result;
use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{alpha1, char, digit1, multispace0},
    combinator::{all_consuming, map_opt, map_res, verify},
    sequence::{delimited, preceded},
    IResult,
};
use plotters::style::RGBColor;

use crate::error::Error;

/// Parse a color string into RGBColor.
///
/// Accepts `#RRGGBB`, `#RGB`, `rgb(r, g, b)`, basic named colors and the
/// `gray0`..`gray100` scale. Surrounding whitespace and letter case are ignored.
pub fn parse_color(color_str: &str) -> Result<RGBColor> {
    match all_consuming(ws(color))(color_str) {
        Ok((_, c)) => Ok(c),
        Err(_) => Err(Error::InvalidColor(color_str.to_string()).into()),
    }
}

/// Format as lowercase `#rrggbb`
pub fn to_hex(color: RGBColor) -> String {
    let RGBColor(r, g, b) = color;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn color(input: &str) -> IResult<&str, RGBColor> {
    alt((hex_color, rgb_function, gray_scale, named_color))(input)
}

fn hex_color(input: &str) -> IResult<&str, RGBColor> {
    preceded(
        char('#'),
        map_opt(take_while1(|c: char| c.is_ascii_hexdigit()), parse_hex_digits),
    )(input)
}

/// RRGGBB or RGB
fn parse_hex_digits(hex: &str) -> Option<RGBColor> {
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

fn channel(input: &str) -> IResult<&str, u8> {
    ws(map_res(digit1, str::parse::<u8>))(input)
}

fn rgb_function(input: &str) -> IResult<&str, RGBColor> {
    let (input, _) = tag_no_case("rgb")(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, r) = channel(input)?;
    let (input, _) = char(',')(input)?;
    let (input, g) = channel(input)?;
    let (input, _) = char(',')(input)?;
    let (input, b) = channel(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, RGBColor(r, g, b)))
}

// gray0 = black, gray100 = white
fn gray_scale(input: &str) -> IResult<&str, RGBColor> {
    let (input, _) = alt((tag_no_case("gray"), tag_no_case("grey")))(input)?;
    let (input, n) = verify(map_res(digit1, str::parse::<u8>), |n: &u8| *n <= 100)(input)?;
    let v = (n as f64 * 2.55).round() as u8;
    Ok((input, RGBColor(v, v, v)))
}

fn named_color(input: &str) -> IResult<&str, RGBColor> {
    map_opt(alpha1, |name: &str| lookup_named(&name.to_ascii_lowercase()))(input)
}

fn lookup_named(name: &str) -> Option<RGBColor> {
    let color = match name {
        "white" => RGBColor(255, 255, 255),
        "black" => RGBColor(0, 0, 0),
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 128, 0),
        "blue" => RGBColor(0, 0, 255),
        "yellow" => RGBColor(255, 255, 0),
        "cyan" => RGBColor(0, 255, 255),
        "magenta" => RGBColor(255, 0, 255),
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "pink" => RGBColor(255, 192, 203),
        "brown" => RGBColor(139, 69, 19),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "darkgray" | "darkgrey" => RGBColor(64, 64, 64),
        "lightgray" | "lightgrey" => RGBColor(192, 192, 192),
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#FF0000").unwrap(), RGBColor(255, 0, 0));
        assert_eq!(parse_color("#00ff00").unwrap(), RGBColor(0, 255, 0));
        assert_eq!(parse_color("#F00").unwrap(), RGBColor(255, 0, 0));
        assert_eq!(parse_color("  #CCCCCC ").unwrap(), RGBColor(204, 204, 204));
    }

    #[test]
    fn test_parse_rgb_function() {
        assert_eq!(parse_color("rgb(10, 20, 30)").unwrap(), RGBColor(10, 20, 30));
        assert_eq!(parse_color("RGB(255,255,0)").unwrap(), RGBColor(255, 255, 0));
        assert!(parse_color("rgb(256, 0, 0)").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("white").unwrap(), RGBColor(255, 255, 255));
        assert_eq!(parse_color("Black").unwrap(), RGBColor(0, 0, 0));
        assert_eq!(parse_color("lightgrey").unwrap(), RGBColor(192, 192, 192));
    }

    #[test]
    fn test_parse_gray_scale() {
        assert_eq!(parse_color("gray0").unwrap(), RGBColor(0, 0, 0));
        assert_eq!(parse_color("gray100").unwrap(), RGBColor(255, 255, 255));
        assert_eq!(parse_color("gray50").unwrap(), RGBColor(127, 127, 127));
        assert_eq!(parse_color("grey90").unwrap(), RGBColor(229, 229, 229));
        assert!(parse_color("gray101").is_err());
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "#12", "#12345", "#GGGGGG", "chartreuse-ish", "#FF0000 extra"] {
            let err = parse_color(bad).unwrap_err();
            assert_eq!(
                err.downcast_ref::<Error>(),
                Some(&Error::InvalidColor(bad.to_string())),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(RGBColor(255, 0, 16)), "#ff0010");
        assert_eq!(to_hex(parse_color("#ABC").unwrap()), "#aabbcc");
    }
}
