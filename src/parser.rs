//! This module provides the parser for `.tm` machine definitions, utilizing the `pest` crate.
//! The grammar lives in `grammar.pest`; this module turns the parse tree into a [`Definition`].

use crate::{
    definition::{Definition, TransitionTable},
    types::{
        Direction, State, Symbol, Transition, TuringMachineError, DEFAULT_BLANK_SYMBOL,
        MAX_PROGRAM_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeSet, HashSet};

/// Derives a `PestParser` for the machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a validated [`Definition`].
///
/// `states` and `alphabet` may be omitted from the input, in which case they are inferred
/// from everything the definition mentions. `initial` defaults to the first state block under
/// `rules:` and `blank` to [`DEFAULT_BLANK_SYMBOL`].
///
/// # Returns
///
/// * `Ok(Definition)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if a required section is missing.
/// * `Err(TuringMachineError::InvalidDefinition)` if the definition fails validation.
pub fn parse(input: &str) -> Result<Definition, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Definition is {} bytes, the limit is {}",
            input.len(),
            MAX_PROGRAM_SIZE
        )));
    }

    let root = TuringMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".to_string()))?;

    let definition = parse_program(root)?;
    definition.validate()?;

    Ok(definition)
}

/// Parses the top-level structure of a definition from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Definition, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut states: Option<BTreeSet<State>> = None;
    let mut alphabet: Option<BTreeSet<Symbol>> = None;
    let mut blank: Option<Symbol> = None;
    let mut tape: Option<Vec<Symbol>> = None;
    let mut head: Option<i64> = None;
    let mut initial_state: Option<State> = None;
    let mut final_states: Option<BTreeSet<State>> = None;
    let mut rules: Option<ParsedRules> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_text(p)),
            Rule::states => states = Some(parse_labels(p).collect()),
            Rule::alphabet => alphabet = Some(parse_symbols(p).collect()),
            Rule::blank => blank = parse_symbols(p).next(),
            Rule::tape => tape = Some(parse_symbols(p).collect()),
            Rule::head => head = Some(parse_head(p)?),
            Rule::initial => initial_state = parse_labels(p).next(),
            Rule::finals => final_states = Some(parse_labels(p).collect()),
            Rule::rules => rules = Some(parse_rules(p)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let rules = check_required_rule(rules, "rules")?;
    let initial_state = check_required_rule(initial_state.or(rules.first_state), "initial")?;
    let blank_symbol = blank.unwrap_or_else(|| DEFAULT_BLANK_SYMBOL.to_string());
    let initial_tape = tape.unwrap_or_default();
    let final_states = final_states.unwrap_or_default();

    let states = states.unwrap_or_else(|| {
        let mut inferred: BTreeSet<State> = rules
            .table
            .iter()
            .flat_map(|(state, _, t)| [state.to_string(), t.next_state.clone()])
            .collect();
        inferred.extend(rules.blocks.iter().cloned());
        inferred.insert(initial_state.clone());
        inferred.extend(final_states.iter().cloned());
        inferred
    });

    let alphabet = alphabet.unwrap_or_else(|| {
        let mut inferred: BTreeSet<Symbol> = rules
            .table
            .iter()
            .flat_map(|(_, read, t)| [read.to_string(), t.write.clone()])
            .collect();
        inferred.insert(blank_symbol.clone());
        inferred.extend(initial_tape.iter().cloned());
        inferred
    });

    Ok(Definition {
        name,
        states,
        alphabet,
        blank_symbol,
        initial_tape,
        initial_state,
        final_states,
        transition_func: rules.table,
        head: head.unwrap_or(0),
    })
}

/// The contents of a `rules:` section.
struct ParsedRules {
    table: TransitionTable,
    /// Every state that heads a block, including blocks without actions.
    blocks: Vec<State>,
    first_state: Option<State>,
}

/// Parses the `rules:` section into a transition table.
///
/// Duplicate state blocks and duplicate `(state, read)` actions are rejected.
fn parse_rules(pair: Pair<Rule>) -> Result<ParsedRules, TuringMachineError> {
    let mut table = TransitionTable::new();
    let mut blocks: Vec<State> = Vec::new();

    for block in pair.into_inner() {
        let span = block.as_span();
        let mut pairs = block.into_inner();
        let state = match pairs.next() {
            Some(label) => label.as_str().to_string(),
            None => continue,
        };

        if blocks.contains(&state) {
            return Err(parse_error(
                &format!("Duplicate transition rule: {state}"),
                span,
            ));
        }

        for action in pairs {
            let span = action.as_span();
            let (read, transition) = parse_action(action)?;

            table
                .insert(state.clone(), read, transition)
                .map_err(|e| parse_error(&e.to_string(), span))?;
        }

        blocks.push(state);
    }

    Ok(ParsedRules {
        first_state: blocks.first().cloned(),
        table,
        blocks,
    })
}

/// Parses a single action from a `Pair<Rule::action>`.
///
/// `read -> write, dir, next` and `read -> dir, next` are accepted; in the short form the
/// written symbol equals the read symbol.
fn parse_action(pair: Pair<Rule>) -> Result<(Symbol, Transition), TuringMachineError> {
    let span = pair.as_span();
    let mut symbols = Vec::new();
    let mut direction = None;
    let mut next_state = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::symbol => symbols.push(parse_symbol(p)),
            Rule::direction => direction = Some(parse_direction(p)?),
            Rule::label => next_state = Some(p.as_str().to_string()),
            _ => {}
        }
    }

    let mut symbols = symbols.into_iter();
    match (symbols.next(), direction, next_state) {
        (Some(read), Some(direction), Some(next_state)) => {
            let write = symbols.next().unwrap_or_else(|| read.clone());
            Ok((
                read,
                Transition {
                    next_state,
                    write,
                    direction,
                },
            ))
        }
        _ => Err(parse_error("Incomplete action", span)),
    }
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left and '>' or 'R' for Right.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

/// Parses the `head:` index, which may be negative.
fn parse_head(pair: Pair<Rule>) -> Result<i64, TuringMachineError> {
    let span = pair.as_span();
    let index = pair
        .into_inner()
        .next()
        .map(|p| p.as_str())
        .unwrap_or_default();

    index
        .parse::<i64>()
        .map_err(|e| parse_error(&format!("Invalid head position {index}: {e}"), span))
}

/// Parses a `Pair<Rule::symbol>`, removing the quotes of a quoted symbol.
fn parse_symbol(pair: Pair<Rule>) -> Symbol {
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::quoted => {
            let quoted = inner.as_str();
            quoted[1..quoted.len() - 1].to_string()
        }
        Some(inner) => inner.as_str().to_string(),
        None => DEFAULT_BLANK_SYMBOL.to_string(),
    }
}

/// Yields the symbols found anywhere below `pair`.
fn parse_symbols<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Symbol> + 'i {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(parse_symbol)
}

/// Yields the labels found anywhere below `pair`.
fn parse_labels<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = State> + 'i {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::label)
        .map(|p| p.as_str().to_string())
}

/// Extracts the trimmed free text of a `name:` section.
fn parse_inner_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if rule == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}:\" declaration", section_name(rule)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

/// The keyword that introduces a section.
fn section_name(rule: Rule) -> String {
    match rule {
        Rule::finals => "final".to_string(),
        rule => format!("{rule:?}"),
    }
}
