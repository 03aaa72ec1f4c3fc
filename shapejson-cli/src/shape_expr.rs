//! Shape expressions such as `map<i64, list<datetime>>` or `record{@id: u64, note: string}`.
//!
//! Syntax is handled by chumsky; names and arities are checked in a second pass so that every
//! problem can point at the offending name.
//!
//! Record fields are written `name: shape`. A leading `@` marks the field as mapped, and
//! `@name = "Key": shape` maps it under a different wire key.

use std::ops::Range;

use chumsky::prelude::*;
use shapejson::{FieldBinding, RecordShape, ScalarKind, Shape};

/// A problem with a shape expression, located in the expression text.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeError {
    pub span: Range<usize>,
    pub message: String,
}

#[derive(Debug)]
struct Expr<'a> {
    name: &'a str,
    span: SimpleSpan,
    body: Body<'a>,
}

#[derive(Debug)]
enum Body<'a> {
    Bare,
    Args(Vec<Expr<'a>>),
    Fields(Vec<FieldExpr<'a>>),
}

#[derive(Debug)]
struct FieldExpr<'a> {
    mapped: bool,
    name: &'a str,
    wire_key: Option<&'a str>,
    shape: Expr<'a>,
}

fn syntax<'a>() -> impl Parser<'a, &'a str, Expr<'a>, extra::Err<Rich<'a, char>>> {
    recursive(|expr| {
        let args = expr
            .clone()
            .separated_by(just(',').padded())
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just('<').padded(), just('>').padded())
            .labelled("type arguments");

        let wire_key = none_of("\"")
            .repeated()
            .to_slice()
            .delimited_by(just('"'), just('"'))
            .labelled("wire key");

        let field = just('@')
            .or_not()
            .then(text::ident().padded())
            .then(just('=').padded().ignore_then(wire_key).or_not())
            .then_ignore(just(':').padded())
            .then(expr)
            .map(|(((at, name), wire_key), shape)| FieldExpr {
                mapped: at.is_some(),
                name,
                wire_key,
                shape,
            })
            .labelled("record field");

        let fields = field
            .separated_by(just(',').padded())
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just('{').padded(), just('}').padded())
            .labelled("record fields");

        text::ident()
            .map_with(|name: &str, e| (name, e.span()))
            .labelled("shape name")
            .then(args.map(Body::Args).or(fields.map(Body::Fields)).or_not())
            .map(|((name, span), body)| Expr {
                name,
                span,
                body: body.unwrap_or(Body::Bare),
            })
            .padded()
    })
    .then_ignore(end())
}

fn build(expr: Expr<'_>) -> Result<Shape, ShapeError> {
    let Expr { name, span, body } = expr;
    let error = |message: String| ShapeError {
        span: span.into_range(),
        message,
    };

    let mut args = match body {
        Body::Fields(fields) if name == "record" => return build_record(fields),
        Body::Fields(_) => return Err(error(format!("`{name}` does not take fields"))),
        _ if name == "record" => {
            return Err(error(String::from("`record` needs a field list, e.g. `record{id: u64}`")))
        }
        Body::Args(args) => args,
        Body::Bare => Vec::new(),
    };

    let arity = match name {
        "array" | "list" => 1,
        "map" => 2,
        _ => 0,
    };
    if args.len() != arity {
        return Err(error(match arity {
            0 => format!("`{name}` does not take type arguments"),
            1 => format!("`{name}` takes one type argument, found {}", args.len()),
            _ => format!("`map` takes a key and a value type, found {}", args.len()),
        }));
    }

    match name {
        "any" => Ok(Shape::Any),
        "array" => Ok(Shape::array(build(args.remove(0))?)),
        "list" => Ok(Shape::list(build(args.remove(0))?)),
        "map" => {
            let value = args.remove(1);
            let key = build(args.remove(0))?;
            Ok(Shape::map(key, build(value)?))
        }
        name => ScalarKind::from_name(name)
            .map(Shape::Scalar)
            .ok_or_else(|| error(format!("unknown shape `{name}`"))),
    }
}

fn build_record(fields: Vec<FieldExpr<'_>>) -> Result<Shape, ShapeError> {
    let mut record = RecordShape::new("record");
    for field in fields {
        let mut binding = FieldBinding::new(field.name, build(field.shape)?);
        if field.mapped {
            binding = binding.mapped();
        }
        if let Some(key) = field.wire_key {
            binding = binding.wire_key(key);
        }
        record = record.field(binding);
    }
    Ok(record.into_shape())
}

pub fn parse(src: &str) -> Result<Shape, Vec<ShapeError>> {
    let expr = syntax().parse(src).into_result().map_err(|errs| {
        errs.into_iter()
            .map(|e| ShapeError {
                span: e.span().into_range(),
                message: e.to_string(),
            })
            .collect::<Vec<_>>()
    })?;
    build(expr).map_err(|e| vec![e])
}
