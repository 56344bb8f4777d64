//! Geometric transformations with cached string and matrix forms.

use crate::number::{fmt_num, round10};
use kurbo::Affine;
use std::cell::OnceCell;
use std::fmt;
use thiserror::Error;

/// Errors raised while reading a `transform` attribute.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformParseError {
    #[error("Empty transform attribute")]
    Empty,
    #[error("Unknown transform function: {0}")]
    UnknownFunction(String),
    #[error("Malformed transform attribute near: {0}")]
    Syntax(String),
    #[error("Invalid number in transform: {0}")]
    InvalidNumber(String),
    #[error("{name}() does not take {count} arguments")]
    ArgumentCount { name: String, count: usize },
}

/// Axis of a skew transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkewAxis {
    X,
    Y,
}

/// How a transform list writes its matrix string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixMode {
    /// One `matrix(...)` holding the product of every member.
    #[default]
    Concat,
    /// Each member's own `matrix(...)`, space separated.
    Multiply,
}

impl MatrixMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatrixMode::Concat => "concat",
            MatrixMode::Multiply => "multiply",
        }
    }

    /// Parse a mode name; `expand` is accepted as another name for `multiply`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "concat" => Some(MatrixMode::Concat),
            "multiply" | "expand" => Some(MatrixMode::Multiply),
            _ => None,
        }
    }
}

/// Parameters of a transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformKind {
    Translate { tx: f64, ty: f64 },
    /// Angle in degrees around `(cx, cy)`.
    Rotate { angle: f64, cx: f64, cy: f64 },
    /// `sy` of `None` scales uniformly.
    Scale { sx: f64, sy: Option<f64> },
    /// Angle in degrees.
    Skew { angle: f64, axis: SkewAxis },
    Matrix(Affine),
    List {
        items: Vec<Transform>,
        mode: MatrixMode,
    },
}

/// A transformation whose string, matrix and matrix-string forms are
/// computed lazily and cached until the next mutation.
///
/// All mutation goes through [`Transform::update`] (or the list helpers,
/// which call it), so an empty cache cell is the only dirty marker.
#[derive(Debug, Clone)]
pub struct Transform {
    kind: TransformKind,
    string: OnceCell<String>,
    matrix: OnceCell<Affine>,
    matrix_string: OnceCell<String>,
    pending_change: Option<String>,
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl From<TransformKind> for Transform {
    fn from(kind: TransformKind) -> Self {
        Self::new(kind)
    }
}

impl Transform {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            string: OnceCell::new(),
            matrix: OnceCell::new(),
            matrix_string: OnceCell::new(),
            pending_change: None,
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(TransformKind::Translate { tx, ty })
    }

    /// Rotation about the origin.
    pub fn rotate(angle: f64) -> Self {
        Self::rotate_about(angle, 0.0, 0.0)
    }

    /// Rotation about `(cx, cy)`. Only the string form supports a non-origin
    /// centre.
    pub fn rotate_about(angle: f64, cx: f64, cy: f64) -> Self {
        Self::new(TransformKind::Rotate { angle, cx, cy })
    }

    pub fn scale(s: f64) -> Self {
        Self::new(TransformKind::Scale { sx: s, sy: None })
    }

    pub fn scale_xy(sx: f64, sy: f64) -> Self {
        Self::new(TransformKind::Scale { sx, sy: Some(sy) })
    }

    pub fn skew_x(angle: f64) -> Self {
        Self::new(TransformKind::Skew {
            angle,
            axis: SkewAxis::X,
        })
    }

    pub fn skew_y(angle: f64) -> Self {
        Self::new(TransformKind::Skew {
            angle,
            axis: SkewAxis::Y,
        })
    }

    pub fn matrix(affine: Affine) -> Self {
        Self::new(TransformKind::Matrix(affine))
    }

    pub fn list(items: Vec<Transform>, mode: MatrixMode) -> Self {
        Self::new(TransformKind::List { items, mode })
    }

    pub fn kind(&self) -> &TransformKind {
        &self.kind
    }

    /// Mutate the parameters. Every cached form is dropped and a change
    /// notification is raised.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TransformKind),
    {
        f(&mut self.kind);
        self.invalidate();
    }

    /// Drop every cached form.
    pub fn invalidate(&mut self) {
        self.string = OnceCell::new();
        self.matrix = OnceCell::new();
        self.matrix_string = OnceCell::new();
        self.pending_change = Some(self.to_string());
    }

    /// Take the change notification raised by the last mutation, carrying
    /// the new string form.
    pub fn take_change(&mut self) -> Option<String> {
        self.pending_change.take()
    }

    /// Append a member. No-op on non-list transforms.
    pub fn push(&mut self, item: Transform) {
        self.update(|kind| {
            if let TransformKind::List { items, .. } = kind {
                items.push(item);
            }
        });
    }

    /// Insert a member at `index`, clamped to the list length.
    pub fn insert(&mut self, index: usize, item: Transform) {
        self.update(|kind| {
            if let TransformKind::List { items, .. } = kind {
                let index = index.min(items.len());
                items.insert(index, item);
            }
        });
    }

    /// Remove and return the member at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Transform> {
        let mut removed = None;
        self.update(|kind| {
            if let TransformKind::List { items, .. } = kind {
                if index < items.len() {
                    removed = Some(items.remove(index));
                }
            }
        });
        removed
    }

    /// Mutate one member in place. Returns false when there is no such member.
    pub fn update_member<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut TransformKind),
    {
        let mut found = false;
        self.update(|kind| {
            if let TransformKind::List { items, .. } = kind {
                if let Some(member) = items.get_mut(index) {
                    member.update(f);
                    member.take_change();
                    found = true;
                }
            }
        });
        found
    }

    pub fn set_mode(&mut self, new_mode: MatrixMode) {
        self.update(|kind| {
            if let TransformKind::List { mode, .. } = kind {
                *mode = new_mode;
            }
        });
    }

    /// Members of a list transform; empty for other kinds.
    pub fn members(&self) -> &[Transform] {
        match &self.kind {
            TransformKind::List { items, .. } => items,
            _ => &[],
        }
    }

    /// Matrix form. Lists are the identity post-multiplied by each member in
    /// order.
    ///
    /// # Panics
    ///
    /// Rotation about a non-origin centre has no matrix form here and panics.
    pub fn to_matrix(&self) -> Affine {
        *self.matrix.get_or_init(|| self.compose_matrix())
    }

    /// The `matrix(a,b,c,d,e,f)` form, or for a list in
    /// [`MatrixMode::Multiply`] every member's matrix string.
    pub fn to_matrix_string(&self) -> &str {
        self.matrix_string.get_or_init(|| match &self.kind {
            TransformKind::List {
                items,
                mode: MatrixMode::Multiply,
            } => items
                .iter()
                .map(Transform::to_matrix_string)
                .collect::<Vec<_>>()
                .join(" "),
            _ => matrix_string(self.to_matrix()),
        })
    }

    /// The string form, cached.
    pub fn as_str(&self) -> &str {
        self.string.get_or_init(|| self.compose_string())
    }

    fn compose_string(&self) -> String {
        match &self.kind {
            TransformKind::Translate { tx, ty } => {
                format!("translate({},{})", fmt_num(*tx), fmt_num(*ty))
            }
            TransformKind::Rotate { angle, cx, cy } => {
                if *cx != 0.0 || *cy != 0.0 {
                    format!(
                        "rotate({},{},{})",
                        fmt_num(*angle),
                        fmt_num(*cx),
                        fmt_num(*cy)
                    )
                } else {
                    format!("rotate({})", fmt_num(*angle))
                }
            }
            TransformKind::Scale { sx, sy: None } => format!("scale({})", fmt_num(*sx)),
            TransformKind::Scale { sx, sy: Some(sy) } => {
                format!("scale({},{})", fmt_num(*sx), fmt_num(*sy))
            }
            TransformKind::Skew { angle, axis } => {
                let name = match axis {
                    SkewAxis::X => "skewX",
                    SkewAxis::Y => "skewY",
                };
                format!("{}({})", name, fmt_num(*angle))
            }
            TransformKind::Matrix(affine) => matrix_string(*affine),
            TransformKind::List { items, .. } => items
                .iter()
                .map(Transform::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn compose_matrix(&self) -> Affine {
        match &self.kind {
            TransformKind::Translate { tx, ty } => Affine::new([1.0, 0.0, 0.0, 1.0, *tx, *ty]),
            TransformKind::Rotate { angle, cx, cy } => {
                assert!(
                    *cx == 0.0 && *cy == 0.0,
                    "matrix form of rotate() only supports rotation about the origin"
                );
                let (sin, cos) = angle.to_radians().sin_cos();
                Affine::new([
                    round10(cos),
                    round10(sin),
                    round10(-sin),
                    round10(cos),
                    0.0,
                    0.0,
                ])
            }
            TransformKind::Scale { sx, sy } => {
                Affine::new([*sx, 0.0, 0.0, sy.unwrap_or(*sx), 0.0, 0.0])
            }
            TransformKind::Skew { angle, axis } => {
                let tan = round10(angle.to_radians().tan());
                match axis {
                    SkewAxis::X => Affine::new([1.0, 0.0, tan, 1.0, 0.0, 0.0]),
                    SkewAxis::Y => Affine::new([1.0, tan, 0.0, 1.0, 0.0, 0.0]),
                }
            }
            TransformKind::Matrix(affine) => *affine,
            TransformKind::List { items, .. } => items
                .iter()
                .fold(Affine::IDENTITY, |acc, item| acc * item.to_matrix()),
        }
    }

    /// Read a `transform` attribute. One function yields that transformation;
    /// several yield a list in [`MatrixMode::Concat`].
    pub fn parse(attr: &str) -> Result<Self, TransformParseError> {
        let mut items = Vec::new();
        let mut rest = attr.trim_start_matches(|c: char| c.is_whitespace() || c == ',');

        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| TransformParseError::Syntax(rest.to_string()))?;
            let name = rest[..open].trim();
            let close = rest[open..]
                .find(')')
                .map(|i| open + i)
                .ok_or_else(|| TransformParseError::Syntax(rest.to_string()))?;
            let args = parse_args(&rest[open + 1..close])?;
            items.push(function_to_transform(name, &args)?);
            rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        }

        match items.len() {
            0 => Err(TransformParseError::Empty),
            1 => Ok(items.remove(0)),
            _ => Ok(Transform::list(items, MatrixMode::Concat)),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn matrix_string(affine: Affine) -> String {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    format!(
        "matrix({},{},{},{},{},{})",
        fmt_num(a),
        fmt_num(b),
        fmt_num(c),
        fmt_num(d),
        fmt_num(e),
        fmt_num(f)
    )
}

fn parse_args(args: &str) -> Result<Vec<f64>, TransformParseError> {
    args.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| TransformParseError::InvalidNumber(s.to_string()))
        })
        .collect()
}

fn function_to_transform(name: &str, args: &[f64]) -> Result<Transform, TransformParseError> {
    let transform = match (name, args) {
        ("translate", [tx]) => Transform::translate(*tx, 0.0),
        ("translate", [tx, ty]) => Transform::translate(*tx, *ty),
        ("rotate", [angle]) => Transform::rotate(*angle),
        ("rotate", [angle, cx, cy]) => Transform::rotate_about(*angle, *cx, *cy),
        ("scale", [s]) => Transform::scale(*s),
        ("scale", [sx, sy]) => Transform::scale_xy(*sx, *sy),
        ("skewX", [angle]) => Transform::skew_x(*angle),
        ("skewY", [angle]) => Transform::skew_y(*angle),
        ("matrix", [a, b, c, d, e, f]) => Transform::matrix(Affine::new([*a, *b, *c, *d, *e, *f])),
        ("translate" | "rotate" | "scale" | "skewX" | "skewY" | "matrix", _) => {
            return Err(TransformParseError::ArgumentCount {
                name: name.to_string(),
                count: args.len(),
            });
        }
        _ => return Err(TransformParseError::UnknownFunction(name.to_string())),
    };
    Ok(transform)
}
