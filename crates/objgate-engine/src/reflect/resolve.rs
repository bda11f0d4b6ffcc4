//! Overload resolution
//!
//! Picks the best candidate for a list of runtime argument types. The
//! result depends only on the candidates (in declaration order) and the
//! argument types, so resolving the same call twice always selects the
//! same overload.

use super::convert::{conversion, ArgType, Conversion, TypeConverter, VARARGS_COST};
use super::registry::ClassRegistry;
use super::types::TypeDesc;

/// Parameter list of a candidate
#[derive(Debug, Clone, Copy)]
pub struct Signature<'a> {
    /// Declared parameter types
    pub params: &'a [TypeDesc],
    /// Whether the last parameter is variable-arity
    pub varargs: bool,
}

/// How a chosen candidate is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Index of the winner among the candidates
    pub index: usize,
    /// Total conversion cost
    pub cost: u32,
    /// Number of implicit numeric widenings
    pub widenings: u32,
    /// One converter per argument
    pub converters: Vec<TypeConverter>,
    /// Position from which trailing arguments are packed into the
    /// variable-arity array, with its component type
    pub packed: Option<(usize, TypeDesc)>,
}

/// Select the best candidate, or `None` when no candidate accepts the
/// arguments.
pub fn resolve(
    classes: &ClassRegistry,
    candidates: &[Signature<'_>],
    args: &[ArgType],
) -> Option<Resolution> {
    let scored: Vec<Resolution> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, sig)| score(classes, index, sig, args))
        .collect();

    let best_key = scored.iter().map(|r| (r.cost, r.widenings)).min()?;
    let mut tied = scored
        .into_iter()
        .filter(|r| (r.cost, r.widenings) == best_key);

    let mut winner = tied.next()?;
    for challenger in tied {
        let a = &candidates[challenger.index];
        let b = &candidates[winner.index];
        if more_specific(classes, a, b) && !more_specific(classes, b, a) {
            winner = challenger;
        }
    }
    Some(winner)
}

/// Whether every parameter of `a` could be passed where `b` expects one
fn more_specific(classes: &ClassRegistry, a: &Signature<'_>, b: &Signature<'_>) -> bool {
    a.params.len() == b.params.len()
        && a.params
            .iter()
            .zip(b.params)
            .all(|(pa, pb)| pa == pb || conversion(pb, &ArgType::of_desc(pa), classes).is_some())
}

fn score(
    classes: &ClassRegistry,
    index: usize,
    sig: &Signature<'_>,
    args: &[ArgType],
) -> Option<Resolution> {
    let direct = if sig.params.len() == args.len() {
        score_fixed(classes, index, sig.params, args)
    } else {
        None
    };

    let packed = if sig.varargs {
        score_packed(classes, index, sig.params, args)
    } else {
        None
    };

    match (direct, packed) {
        (Some(d), Some(p)) => Some(if p.cost < d.cost { p } else { d }),
        (d, p) => d.or(p),
    }
}

fn score_fixed(
    classes: &ClassRegistry,
    index: usize,
    params: &[TypeDesc],
    args: &[ArgType],
) -> Option<Resolution> {
    let conversions = params
        .iter()
        .zip(args)
        .map(|(param, arg)| conversion(param, arg, classes))
        .collect::<Option<Vec<Conversion>>>()?;
    Some(total(index, conversions, None))
}

fn score_packed(
    classes: &ClassRegistry,
    index: usize,
    params: &[TypeDesc],
    args: &[ArgType],
) -> Option<Resolution> {
    let (last, fixed) = params.split_last()?;
    let TypeDesc::Array(component) = last else {
        return None;
    };
    if args.len() < fixed.len() {
        return None;
    }

    let mut conversions = fixed
        .iter()
        .zip(args)
        .map(|(param, arg)| conversion(param, arg, classes))
        .collect::<Option<Vec<Conversion>>>()?;
    for arg in &args[fixed.len()..] {
        conversions.push(conversion(component, arg, classes)?);
    }

    let mut resolution = total(index, conversions, Some((fixed.len(), (**component).clone())));
    resolution.cost += VARARGS_COST;
    Some(resolution)
}

fn total(index: usize, conversions: Vec<Conversion>, packed: Option<(usize, TypeDesc)>) -> Resolution {
    let cost = conversions.iter().map(|c| c.cost).sum();
    let widenings = conversions.iter().filter(|c| c.widening).count() as u32;
    Resolution {
        index,
        cost,
        widenings,
        converters: conversions.into_iter().map(|c| c.converter).collect(),
        packed,
    }
}
