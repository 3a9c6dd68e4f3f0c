//! Turning raw hex responses into trouble codes and the VIN

use log::trace;

use super::{Dtc, DtcEntry, DtcReport};
use crate::{lookup::DtcLookup, Error, Result};

/// Characters in one raw trouble code
const TOKEN_WIDTH: usize = 4;

/// Strip `removed_byte_count` leading bytes (two hex characters each) from every line and join
/// what is left into one string
///
/// The lines are taken to be one payload split only for transport, so they are concatenated
/// without a separator.
pub fn prune(data: &str, removed_byte_count: usize) -> String {
    data.split('\n')
        .flat_map(|line| line.chars().skip(2 * removed_byte_count))
        .collect()
}

/// Split a pruned response into four character codes and render each with `lookup`
///
/// Tokens with a value of zero are padding and are left out. A token that is not hex, or whose
/// leading digit has no prefix, fails the whole decode. A short trailing token that is not zero
/// is malformed too; it is never rendered as a partial code.
pub fn decode_trouble_codes<L: DtcLookup + ?Sized>(data: &str, lookup: &L) -> Result<DtcReport> {
    let chars: Vec<char> = data.chars().collect();
    let mut entries = Vec::new();

    for token in chars.chunks(TOKEN_WIDTH) {
        let token: String = token.iter().collect();
        if !token.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::MalformedToken(token));
        }
        let raw =
            u16::from_str_radix(&token, 16).map_err(|_| Error::MalformedToken(token.clone()))?;
        if raw == 0 {
            trace!("decode_trouble_codes: skipping padding {:?}", token);
            continue;
        }
        if token.len() != TOKEN_WIDTH {
            return Err(Error::MalformedToken(token));
        }

        // all four characters are ASCII hex digits at this point
        let digit = char::from(token.as_bytes()[0]);
        let body = &token[1..];
        let prefix = lookup
            .prefix_of(digit)
            .ok_or(Error::UnknownPrefix(digit))?;
        let code = format!("{}{}", prefix, body.to_ascii_uppercase());
        let description = lookup.description_of(&code).map(str::to_owned);

        entries.push(DtcEntry {
            dtc: Dtc::new(raw, code),
            description,
        });
    }

    Ok(DtcReport::new(entries))
}

/// Decode a pruned VIN response
///
/// NUL bytes become spaces. The length is not checked.
pub fn decode_vin(data: &str) -> Result<String> {
    let hex: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if hex.len() % 2 != 0 {
        return Err(Error::InvalidVin(format!("odd number of hex digits in {:?}", data)));
    }

    let bytes = hex
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| Error::InvalidVin(format!("not hex: {:?}", data)))
        })
        .map(|b| b.map(|b| if b == 0 { b' ' } else { b }))
        .collect::<Result<Vec<u8>>>()?;

    Ok(String::from_utf8(bytes)?)
}
