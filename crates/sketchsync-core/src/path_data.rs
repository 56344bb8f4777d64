//! Path data encoder for the `d` attribute of path shapes.
//!
//! Commands are written with SVG's shortcut rules: a command letter that
//! repeats the previous one is replaced by a single space, and straight
//! lines along one axis become `H`/`V` commands. The pen position and the
//! stack of open sub-paths are tracked so those shortcuts can be chosen.

use crate::number::fmt_num;
use kurbo::Point;
use std::fmt;
use thiserror::Error;

/// Errors raised while reading an existing `d` attribute.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathParseError {
    #[error("Path data must start with a command, found '{0}'")]
    MissingCommand(char),
    #[error("Unknown path command: {0}")]
    UnknownCommand(char),
    #[error("Invalid number in path data: {0}")]
    InvalidNumber(String),
    #[error("Command '{letter}' takes {arity} parameters per segment, got {count}")]
    ParameterCount {
        letter: char,
        arity: usize,
        count: usize,
    },
}

/// The kind of a single path command, independent of absolute/relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    MoveTo,
    LineTo,
    HorizontalLineTo,
    VerticalLineTo,
    ClosePath,
    Arc,
    QuadraticCurve,
    QuadraticCurveSmooth,
    CubicCurve,
    CubicCurveSmooth,
}

impl CommandKind {
    /// The command letter; relative commands use lower case.
    pub fn letter(self, relative: bool) -> char {
        let upper = match self {
            CommandKind::MoveTo => 'M',
            CommandKind::LineTo => 'L',
            CommandKind::HorizontalLineTo => 'H',
            CommandKind::VerticalLineTo => 'V',
            CommandKind::ClosePath => 'Z',
            CommandKind::Arc => 'A',
            CommandKind::QuadraticCurve => 'Q',
            CommandKind::QuadraticCurveSmooth => 'T',
            CommandKind::CubicCurve => 'C',
            CommandKind::CubicCurveSmooth => 'S',
        };
        if relative {
            upper.to_ascii_lowercase()
        } else {
            upper
        }
    }

    /// Parse a command letter into its kind and relative flag.
    pub fn from_letter(letter: char) -> Option<(Self, bool)> {
        let kind = match letter.to_ascii_uppercase() {
            'M' => CommandKind::MoveTo,
            'L' => CommandKind::LineTo,
            'H' => CommandKind::HorizontalLineTo,
            'V' => CommandKind::VerticalLineTo,
            'Z' => CommandKind::ClosePath,
            'A' => CommandKind::Arc,
            'Q' => CommandKind::QuadraticCurve,
            'T' => CommandKind::QuadraticCurveSmooth,
            'C' => CommandKind::CubicCurve,
            'S' => CommandKind::CubicCurveSmooth,
            _ => return None,
        };
        Some((kind, letter.is_ascii_lowercase()))
    }

    /// Number of parameters one segment of this command takes.
    pub fn arity(self) -> usize {
        match self {
            CommandKind::ClosePath => 0,
            CommandKind::HorizontalLineTo | CommandKind::VerticalLineTo => 1,
            CommandKind::MoveTo | CommandKind::LineTo | CommandKind::QuadraticCurveSmooth => 2,
            CommandKind::QuadraticCurve | CommandKind::CubicCurveSmooth => 4,
            CommandKind::CubicCurve => 6,
            CommandKind::Arc => 7,
        }
    }
}

/// One authored path command.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub kind: CommandKind,
    pub params: Vec<f64>,
    pub relative: bool,
}

impl PathCommand {
    pub fn new(kind: CommandKind, params: Vec<f64>, relative: bool) -> Self {
        Self {
            kind,
            params,
            relative,
        }
    }

    /// The letter written for this command.
    pub fn letter(&self) -> char {
        self.kind.letter(self.relative)
    }

    /// Parameters as written after the letter, `None` for close-path.
    fn params_string(&self) -> Option<String> {
        let p = &self.params;
        let pair = |i: usize| format!("{},{}", fmt_num(p[i]), fmt_num(p[i + 1]));
        let flag = |v: f64| if v != 0.0 { "1" } else { "0" };
        match self.kind {
            CommandKind::ClosePath => None,
            CommandKind::HorizontalLineTo | CommandKind::VerticalLineTo => Some(fmt_num(p[0])),
            CommandKind::MoveTo | CommandKind::LineTo | CommandKind::QuadraticCurveSmooth => {
                Some(pair(0))
            }
            CommandKind::QuadraticCurve | CommandKind::CubicCurveSmooth => {
                Some(format!("{} {}", pair(0), pair(2)))
            }
            CommandKind::CubicCurve => Some(format!("{} {} {}", pair(0), pair(2), pair(4))),
            CommandKind::Arc => Some(format!(
                "{} {} {} {} {}",
                pair(0),
                fmt_num(p[2]),
                flag(p[3]),
                flag(p[4]),
                pair(5)
            )),
        }
    }

    /// End point of the command, `None` for close-path.
    fn end_point(&self) -> (Option<f64>, Option<f64>) {
        let n = self.params.len();
        match self.kind {
            CommandKind::ClosePath => (None, None),
            CommandKind::HorizontalLineTo => (Some(self.params[0]), None),
            CommandKind::VerticalLineTo => (None, Some(self.params[0])),
            _ => (Some(self.params[n - 2]), Some(self.params[n - 1])),
        }
    }
}

/// Builder for compact path data strings.
#[derive(Debug, Clone, Default)]
pub struct PathData {
    /// Serialized commands, without the synthesized `M0,0` prefix.
    path: String,
    commands: Vec<PathCommand>,
    pen: Point,
    sub_paths: Vec<Point>,
    last_letter: Option<char>,
    /// New serialized value after the most recent mutation.
    pending_change: Option<String>,
}

impl PathData {
    /// Create empty path data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an existing `d` attribute, replaying each command through the
    /// same shortcut and pen rules used when authoring.
    pub fn parse(d: &str) -> Result<Self, PathParseError> {
        let mut data = PathData::new();
        for (letter, args) in split_segments(d)? {
            let (kind, relative) =
                CommandKind::from_letter(letter).ok_or(PathParseError::UnknownCommand(letter))?;
            let numbers = parse_numbers(args)?;
            let arity = kind.arity();

            if arity == 0 {
                if !numbers.is_empty() {
                    return Err(PathParseError::ParameterCount {
                        letter,
                        arity,
                        count: numbers.len(),
                    });
                }
                data.push_command(PathCommand::new(kind, Vec::new(), relative));
                continue;
            }

            if numbers.is_empty() || numbers.len() % arity != 0 {
                return Err(PathParseError::ParameterCount {
                    letter,
                    arity,
                    count: numbers.len(),
                });
            }

            for (i, chunk) in numbers.chunks(arity).enumerate() {
                // Extra coordinate pairs after a move are implicit line-tos.
                let kind = if kind == CommandKind::MoveTo && i > 0 {
                    CommandKind::LineTo
                } else {
                    kind
                };
                data.push_command(PathCommand::new(kind, chunk.to_vec(), relative));
            }
        }
        data.pending_change = None;
        Ok(data)
    }

    /// Commands in authoring order.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Current pen position.
    pub fn pen(&self) -> Point {
        self.pen
    }

    /// Whether no command has been written.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take the change notification raised by the last mutation, if any.
    ///
    /// The value is the full serialized path, ready to be written back to the
    /// owning shape's `d` attribute.
    pub fn take_change(&mut self) -> Option<String> {
        self.pending_change.take()
    }

    fn set_pen(&mut self, x: Option<f64>, y: Option<f64>, relative: bool) {
        if relative {
            if let Some(x) = x {
                self.pen.x += x;
            }
            if let Some(y) = y {
                self.pen.y += y;
            }
        } else {
            if let Some(x) = x {
                self.pen.x = x;
            }
            if let Some(y) = y {
                self.pen.y = y;
            }
        }
    }

    fn start_sub_path(&mut self) {
        self.sub_paths.push(self.pen);
    }

    fn end_sub_path(&mut self) {
        if let Some(start) = self.sub_paths.pop() {
            self.pen = start;
        }
    }

    /// Append a command, applying shortcut elision and pen tracking.
    fn push_command(&mut self, command: PathCommand) {
        // Close-path never shortcuts. Repeated pairs after a move read as
        // line-to, so moves keep their letter too.
        let allow_shortcut = !matches!(command.kind, CommandKind::ClosePath | CommandKind::MoveTo);
        let letter = command.letter();

        if self.last_letter != Some(letter) || !allow_shortcut {
            self.path.push(letter);
        } else {
            self.path.push(' ');
        }
        if let Some(params) = command.params_string() {
            self.path.push_str(&params);
        }
        self.last_letter = Some(letter);

        match command.kind {
            CommandKind::MoveTo => {
                let (x, y) = command.end_point();
                self.set_pen(x, y, command.relative);
                self.start_sub_path();
            }
            CommandKind::ClosePath => self.end_sub_path(),
            _ => {
                let (x, y) = command.end_point();
                self.set_pen(x, y, command.relative);
            }
        }

        self.commands.push(command);
        self.pending_change = Some(self.to_string());
    }

    /// Move the pen and start a new sub-path.
    pub fn move_to(&mut self, x: f64, y: f64, relative: bool) -> &mut Self {
        self.push_command(PathCommand::new(CommandKind::MoveTo, vec![x, y], relative));
        self
    }

    /// Draw a straight line, preferring `H`/`V` when only one axis changes.
    /// Drawing to the current pen position writes nothing.
    pub fn line_to(&mut self, x: f64, y: f64, relative: bool) -> &mut Self {
        let (target_x, target_y) = if relative {
            (self.pen.x + x, self.pen.y + y)
        } else {
            (x, y)
        };
        let same_x = target_x == self.pen.x;
        let same_y = target_y == self.pen.y;

        match (same_x, same_y) {
            (true, true) => self,
            (true, false) => self.line_to_y(y, relative),
            (false, true) => self.line_to_x(x, relative),
            (false, false) => {
                self.push_command(PathCommand::new(CommandKind::LineTo, vec![x, y], relative));
                self
            }
        }
    }

    /// Draw a horizontal line.
    pub fn line_to_x(&mut self, x: f64, relative: bool) -> &mut Self {
        self.push_command(PathCommand::new(
            CommandKind::HorizontalLineTo,
            vec![x],
            relative,
        ));
        self
    }

    /// Draw a vertical line.
    pub fn line_to_y(&mut self, y: f64, relative: bool) -> &mut Self {
        self.push_command(PathCommand::new(
            CommandKind::VerticalLineTo,
            vec![y],
            relative,
        ));
        self
    }

    /// Close the current sub-path; the pen returns to where it started.
    pub fn close_path(&mut self) -> &mut Self {
        self.push_command(PathCommand::new(CommandKind::ClosePath, Vec::new(), false));
        self
    }

    /// Draw an elliptical arc.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
        relative: bool,
    ) -> &mut Self {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        self.push_command(PathCommand::new(
            CommandKind::Arc,
            vec![rx, ry, rotation, flag(large_arc), flag(sweep), x, y],
            relative,
        ));
        self
    }

    /// Draw a circular arc, a special case of [`PathData::arc`].
    pub fn circular_arc(
        &mut self,
        r: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
        relative: bool,
    ) -> &mut Self {
        self.arc(r, r, 0.0, large_arc, sweep, x, y, relative)
    }

    /// Draw a quadratic bezier curve.
    pub fn quadratic_curve(&mut self, x1: f64, y1: f64, x: f64, y: f64, relative: bool) -> &mut Self {
        self.push_command(PathCommand::new(
            CommandKind::QuadraticCurve,
            vec![x1, y1, x, y],
            relative,
        ));
        self
    }

    /// Draw a smooth quadratic curve whose control point mirrors the previous one.
    pub fn quadratic_curve_smooth(&mut self, x: f64, y: f64, relative: bool) -> &mut Self {
        if !matches!(self.last_letter, Some('Q' | 'q' | 'T' | 't')) {
            log::warn!("Smooth quadratic curve should follow another quadratic curve");
        }
        self.push_command(PathCommand::new(
            CommandKind::QuadraticCurveSmooth,
            vec![x, y],
            relative,
        ));
        self
    }

    /// Draw a cubic bezier curve.
    #[allow(clippy::too_many_arguments)]
    pub fn cubic_curve(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
        relative: bool,
    ) -> &mut Self {
        self.push_command(PathCommand::new(
            CommandKind::CubicCurve,
            vec![x1, y1, x2, y2, x, y],
            relative,
        ));
        self
    }

    /// Draw a smooth cubic curve whose first control point mirrors the previous one.
    pub fn cubic_curve_smooth(&mut self, x2: f64, y2: f64, x: f64, y: f64, relative: bool) -> &mut Self {
        if !matches!(self.last_letter, Some('C' | 'c' | 'S' | 's')) {
            log::warn!("Smooth cubic curve should follow another cubic curve");
        }
        self.push_command(PathCommand::new(
            CommandKind::CubicCurveSmooth,
            vec![x2, y2, x, y],
            relative,
        ));
        self
    }

    /// Remove all commands and reset the pen.
    pub fn clear(&mut self) -> &mut Self {
        self.path.clear();
        self.commands.clear();
        self.pen = Point::ZERO;
        self.sub_paths.clear();
        self.last_letter = None;
        self.pending_change = Some(String::new());
        self
    }
}

impl PartialEq for PathData {
    fn eq(&self, other: &Self) -> bool {
        self.commands == other.commands
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() && !self.path.starts_with(['M', 'm']) {
            f.write_str("M0,0")?;
        }
        f.write_str(&self.path)
    }
}

/// Split a `d` attribute into `(letter, arguments)` segments.
fn split_segments(d: &str) -> Result<Vec<(char, &str)>, PathParseError> {
    let mut segments = Vec::new();
    let mut current: Option<(char, usize)> = None;

    for (i, c) in d.char_indices() {
        // 'e' belongs to exponents, never a command.
        if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            if let Some((letter, start)) = current {
                segments.push((letter, &d[start..i]));
            }
            current = Some((c, i + c.len_utf8()));
        } else if current.is_none() && !c.is_whitespace() && c != ',' {
            return Err(PathParseError::MissingCommand(c));
        }
    }
    if let Some((letter, start)) = current {
        segments.push((letter, &d[start..]));
    }
    Ok(segments)
}

/// Parse the numbers of one segment, accepting SVG's compact forms
/// (`1-2`, `.5.5`, `1e3`).
fn parse_numbers(args: &str) -> Result<Vec<f64>, PathParseError> {
    let bytes = args.as_bytes();
    let mut numbers = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b',' || c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        if c == b'+' || c == b'-' {
            i += 1;
        }
        let mut seen_dot = false;
        let mut seen_digit = false;
        while i < bytes.len() {
            match bytes[i] {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            i += 1;
        }
        if seen_digit && i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
            let mut j = i + 1;
            if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                j += 1;
            }
            if j < bytes.len() && bytes[j].is_ascii_digit() {
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                i = j;
            }
        }

        let invalid = || {
            let rest = &args[start..];
            let token = rest
                .split(|ch: char| ch.is_whitespace() || ch == ',')
                .next()
                .unwrap_or(rest);
            PathParseError::InvalidNumber(token.to_string())
        };
        if !seen_digit {
            return Err(invalid());
        }
        let value: f64 = args[start..i].parse().map_err(|_| invalid())?;
        numbers.push(value);
    }
    Ok(numbers)
}
