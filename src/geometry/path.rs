//! Path command sequences and the `d` attribute grammar.
//!
//! Only absolute commands are produced and accepted, plus `z`. Tokens may be
//! separated by whitespace or commas, and an opcode may be glued to its first
//! operand (`M0 0L10 0`).

use std::fmt::Write as _;

use super::{endpoint_to_center, format_number};
use crate::error::{DrawkitError, Result};
use crate::types::{Point, Rect};

/// One drawing command with its operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadraticCurveTo {
        control: Point,
        to: Point,
    },
    CubicCurveTo {
        control1: Point,
        control2: Point,
        to: Point,
    },
    /// SVG elliptical arc to `to`.
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    ClosePath,
}

impl PathCommand {
    pub fn opcode(&self) -> char {
        match self {
            Self::MoveTo(_) => 'M',
            Self::LineTo(_) => 'L',
            Self::QuadraticCurveTo { .. } => 'Q',
            Self::CubicCurveTo { .. } => 'C',
            Self::ArcTo { .. } => 'A',
            Self::ClosePath => 'Z',
        }
    }

    /// Number of numeric operands the opcode takes.
    pub fn operand_count(opcode: char) -> Option<usize> {
        match opcode {
            'M' | 'L' => Some(2),
            'Q' => Some(4),
            'C' => Some(6),
            'A' => Some(7),
            'Z' | 'z' => Some(0),
            _ => None,
        }
    }

    /// End point of the command, if it moves the pen.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) => Some(p),
            Self::QuadraticCurveTo { to, .. }
            | Self::CubicCurveTo { to, .. }
            | Self::ArcTo { to, .. } => Some(to),
            Self::ClosePath => None,
        }
    }
}

/// An ordered sequence of drawing commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathSpec {
    commands: Vec<PathCommand>,
}

impl PathSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from commands, checking that the sequence starts with a move or arc.
    pub fn from_commands(commands: Vec<PathCommand>) -> Result<Self> {
        let path = Self { commands };
        path.validate()?;
        Ok(path)
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, control: Point, to: Point) -> &mut Self {
        self.commands
            .push(PathCommand::QuadraticCurveTo { control, to });
        self
    }

    pub fn cubic_to(&mut self, control1: Point, control2: Point, to: Point) -> &mut Self {
        self.commands.push(PathCommand::CubicCurveTo {
            control1,
            control2,
            to,
        });
        self
    }

    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    ) -> &mut Self {
        self.commands.push(PathCommand::ArcTo {
            rx,
            ry,
            rotation,
            large_arc,
            sweep,
            to,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::ClosePath);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// A well-formed path is non-empty and begins with `MoveTo` or `ArcTo`.
    pub fn validate(&self) -> Result<()> {
        match self.commands.first() {
            None => Err(DrawkitError::PathData("path has no commands".to_string())),
            Some(PathCommand::MoveTo(_) | PathCommand::ArcTo { .. }) => Ok(()),
            Some(other) => Err(DrawkitError::PathData(format!(
                "path must start with M or A, found {}",
                other.opcode()
            ))),
        }
    }

    /// Serialize to `d` attribute syntax.
    pub fn to_path_data(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push(command.opcode());
            match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => push_points(&mut out, &[p]),
                PathCommand::QuadraticCurveTo { control, to } => {
                    push_points(&mut out, &[control, to]);
                }
                PathCommand::CubicCurveTo {
                    control1,
                    control2,
                    to,
                } => push_points(&mut out, &[control1, control2, to]),
                PathCommand::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                } => {
                    let _ = write!(
                        out,
                        " {} {} {} {} {}",
                        format_number(rx),
                        format_number(ry),
                        format_number(rotation),
                        u8::from(large_arc),
                        u8::from(sweep)
                    );
                    push_points(&mut out, &[to]);
                }
                PathCommand::ClosePath => {}
            }
        }
        out
    }

    /// Parse `d` attribute syntax.
    pub fn parse(data: &str) -> Result<Self> {
        let tokens = tokenize(data)?;
        let mut commands = Vec::new();
        let mut cursor = 0;
        let mut current: Option<char> = None;

        while let Some(token) = tokens.get(cursor) {
            let opcode = match *token {
                Token::Opcode(c) => {
                    cursor += 1;
                    c
                }
                // Implicit repetition; a repeated moveto becomes a lineto.
                Token::Number(_) => match current {
                    Some('M') => 'L',
                    Some(c) if c != 'Z' && c != 'z' => c,
                    _ => {
                        return Err(DrawkitError::PathData(format!(
                            "operand without a command at token {cursor}"
                        )))
                    }
                },
            };
            let count = PathCommand::operand_count(opcode)
                .ok_or_else(|| DrawkitError::PathData(format!("unknown opcode `{opcode}`")))?;
            let operands = take_operands(&tokens, cursor, count, opcode)?;
            cursor += count;
            commands.push(build_command(opcode, &operands)?);
            current = Some(opcode);
        }

        Self::from_commands(commands)
    }

    /// Conservative bounding box. Arcs contribute the box of their full ellipse.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = Vec::with_capacity(self.commands.len() * 2);
        let mut pen: Option<Point> = None;
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
                PathCommand::QuadraticCurveTo { control, to } => {
                    points.extend([control, to]);
                }
                PathCommand::CubicCurveTo {
                    control1,
                    control2,
                    to,
                } => points.extend([control1, control2, to]),
                PathCommand::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                } => {
                    points.push(to);
                    if let Some(from) = pen {
                        points.push(from);
                        if let Some(arc) =
                            endpoint_to_center(from, to, rx, ry, rotation, large_arc, sweep)
                        {
                            let r = arc.rx.max(arc.ry);
                            points.push(Point::new(arc.center.x - r, arc.center.y - r));
                            points.push(Point::new(arc.center.x + r, arc.center.y + r));
                        }
                    }
                }
                PathCommand::ClosePath => {}
            }
            if let Some(p) = command.end_point() {
                pen = Some(p);
            }
        }
        Rect::bounding(points)
    }
}

fn push_points(out: &mut String, points: &[Point]) {
    for p in points {
        let _ = write!(out, " {} {}", format_number(p.x), format_number(p.y));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Opcode(char),
    Number(f64),
}

fn tokenize(data: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut number = String::new();
    let mut previous = ' ';

    for c in data.chars() {
        match c {
            c if c.is_whitespace() || c == ',' => flush_number(&mut number, &mut tokens)?,
            c if c.is_ascii_alphabetic() && c != 'e' && c != 'E' => {
                flush_number(&mut number, &mut tokens)?;
                tokens.push(Token::Opcode(c));
            }
            '-' | '+' if !number.is_empty() && previous != 'e' && previous != 'E' => {
                flush_number(&mut number, &mut tokens)?;
                number.push(c);
            }
            _ => number.push(c),
        }
        previous = c;
    }
    flush_number(&mut number, &mut tokens)?;
    if tokens.is_empty() {
        return Err(DrawkitError::PathData("empty path data".to_string()));
    }
    Ok(tokens)
}

fn flush_number(number: &mut String, tokens: &mut Vec<Token>) -> Result<()> {
    if number.is_empty() {
        return Ok(());
    }
    let value = number
        .parse::<f64>()
        .map_err(|_| DrawkitError::PathData(format!("invalid number `{number}`")))?;
    tokens.push(Token::Number(value));
    number.clear();
    Ok(())
}

fn take_operands(tokens: &[Token], cursor: usize, count: usize, opcode: char) -> Result<Vec<f64>> {
    let mut operands = Vec::with_capacity(count);
    for offset in 0..count {
        match tokens.get(cursor + offset) {
            Some(Token::Number(v)) => operands.push(*v),
            _ => {
                return Err(DrawkitError::PathData(format!(
                    "`{opcode}` expects {count} operands, got {offset}"
                )))
            }
        }
    }
    Ok(operands)
}

fn build_command(opcode: char, operands: &[f64]) -> Result<PathCommand> {
    let point = |i: usize| -> Result<Point> {
        match (operands.get(i), operands.get(i + 1)) {
            (Some(&x), Some(&y)) => Ok(Point::new(x, y)),
            _ => Err(DrawkitError::PathData(format!(
                "`{opcode}` is missing a coordinate"
            ))),
        }
    };
    let flag = |i: usize| -> Result<bool> {
        match operands.get(i) {
            Some(v) if *v == 0.0 => Ok(false),
            Some(v) if (*v - 1.0).abs() < f64::EPSILON => Ok(true),
            _ => Err(DrawkitError::PathData(format!(
                "`{opcode}` flag must be 0 or 1"
            ))),
        }
    };
    let scalar = |i: usize| -> Result<f64> {
        operands
            .get(i)
            .copied()
            .ok_or_else(|| DrawkitError::PathData(format!("`{opcode}` is missing an operand")))
    };

    Ok(match opcode {
        'M' => PathCommand::MoveTo(point(0)?),
        'L' => PathCommand::LineTo(point(0)?),
        'Q' => PathCommand::QuadraticCurveTo {
            control: point(0)?,
            to: point(2)?,
        },
        'C' => PathCommand::CubicCurveTo {
            control1: point(0)?,
            control2: point(2)?,
            to: point(4)?,
        },
        'A' => PathCommand::ArcTo {
            rx: scalar(0)?,
            ry: scalar(1)?,
            rotation: scalar(2)?,
            large_arc: flag(3)?,
            sweep: flag(4)?,
            to: point(5)?,
        },
        'Z' | 'z' => PathCommand::ClosePath,
        other => {
            return Err(DrawkitError::PathData(format!("unknown opcode `{other}`")));
        }
    })
}
