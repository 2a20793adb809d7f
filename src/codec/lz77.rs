//! LZ77 byte compression in the game's fixed format.
//!
//! The stream is a sequence of groups. Each group starts with a flag byte whose bits,
//! most significant first, describe up to eight entries:
//!
//! - `1`: a literal byte follows.
//! - `0`: a two byte back-reference follows, `offset = (b0 & 0xF0) << 4 | b1` and
//!   `length = 18 - (b0 & 0x0F)`. An offset of zero terminates the stream.
//!
//! Back-references copy byte by byte from `offset` bytes behind the output cursor, so a
//! reference may overlap the bytes it produces.

use crate::{codec::Parser, Result};

const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 18;
const MAX_OFFSET: usize = 0x0FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(u8),
    Match { offset: usize, length: usize },
    End,
}

#[derive(Debug, Clone, Copy)]
struct Match {
    offset: usize,
    length: usize,
}

/// Find the longest back-reference for `input[position..]`, preferring the nearest.
fn find_match(input: &[u8], position: usize) -> Option<Match> {
    if position == 0 || position >= input.len() {
        return None;
    }

    let max_length = MAX_MATCH.min(input.len() - position);
    if max_length < MIN_MATCH {
        return None;
    }

    let lookahead = &input[position..position + max_length];
    let earliest = position.saturating_sub(MAX_OFFSET);
    let mut best: Option<Match> = None;

    for start in (earliest..position).rev() {
        let length = input[start..]
            .iter()
            .zip(lookahead)
            .take_while(|(a, b)| a == b)
            .count();

        if length >= MIN_MATCH && best.map_or(true, |best| length > best.length) {
            best = Some(Match {
                offset: position - start,
                length,
            });
            if length == max_length {
                break;
            }
        }
    }

    best
}

fn tokenize(input: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
    let mut position = 0;

    while position < input.len() {
        match find_match(input, position) {
            Some(current) => {
                // One step of lazy matching: prefer a literal if the next position matches longer.
                if let Some(next) = find_match(input, position + 1) {
                    if next.length > current.length {
                        tokens.push(Token::Literal(input[position]));
                        tokens.push(Token::Match {
                            offset: next.offset,
                            length: next.length,
                        });
                        position += 1 + next.length;
                        continue;
                    }
                }

                tokens.push(Token::Match {
                    offset: current.offset,
                    length: current.length,
                });
                position += current.length;
            }
            None => {
                tokens.push(Token::Literal(input[position]));
                position += 1;
            }
        }
    }

    tokens.push(Token::End);
    tokens
}

/// Compress `input`.
#[must_use]
pub fn encode(input: &[u8]) -> Vec<u8> {
    let tokens = tokenize(input);
    let mut output = Vec::with_capacity(input.len() + input.len() / 8 + 3);

    for group in tokens.chunks(8) {
        let mut flags = 0u8;
        for (bit, token) in group.iter().enumerate() {
            if matches!(token, Token::Literal(_)) {
                flags |= 0x80 >> bit;
            }
        }
        output.push(flags);

        for token in group {
            match *token {
                Token::Literal(byte) => output.push(byte),
                #[allow(clippy::cast_possible_truncation)]
                Token::Match { offset, length } => {
                    output.push((((offset >> 4) & 0xF0) | (MAX_MATCH - length)) as u8);
                    output.push((offset & 0xFF) as u8);
                }
                Token::End => output.extend_from_slice(&[0x00, 0x00]),
            }
        }
    }

    log::trace!("lz77: {} bytes -> {} bytes", input.len(), output.len());
    output
}

/// Decompress a stream, returning the output and the number of input bytes consumed.
///
/// # Errors
/// Returns [`crate::Error::CorruptData`] if the stream is truncated, lacks its
/// terminator, or references bytes before the start of the output.
pub fn decode(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut parser = Parser::new(data);
    let mut output = Vec::with_capacity(data.len() * 2);

    loop {
        let flags = parser.read_be::<u8>()?;
        for bit in 0..8 {
            if flags & (0x80 >> bit) != 0 {
                output.push(parser.read_be::<u8>()?);
                continue;
            }

            let high = usize::from(parser.read_be::<u8>()?);
            let low = usize::from(parser.read_be::<u8>()?);
            let offset = ((high & 0xF0) << 4) | low;
            let length = MAX_MATCH - (high & 0x0F);

            if offset == 0 {
                return Ok((output, parser.pos()));
            }
            if offset > output.len() {
                return Err(corrupt_data!(
                    "back-reference of {} bytes at output offset {} reaches before the start",
                    offset,
                    output.len()
                ));
            }

            let start = output.len() - offset;
            for i in 0..length {
                output.push(output[start + i]);
            }
        }
    }
}
