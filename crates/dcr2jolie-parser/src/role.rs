//! Parser for choreography role strings.
//!
//! Every role of a choreography event is declared as a string matching
//! `^(S|R):((U|S):)?([^+]+)$`: the first group marks the sender/receiver
//! direction, the optional second group classifies the role as User or
//! Service (Service when absent), and the remainder is the role name.

use winnow::{
    Parser,
    combinator::{alt, opt},
    token::take_while,
};

use crate::error::ParseError;

/// A parsed role declaration of a choreography event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDecl {
    /// The role carries the `S:` prefix and initiates the event.
    pub is_initiator: bool,
    /// The role carries the `U:` classification (User rather than Service).
    pub is_user: bool,
    /// The role name.
    pub name: String,
}

fn direction(input: &mut &str) -> winnow::ModalResult<bool> {
    alt(("S:".value(true), "R:".value(false))).parse_next(input)
}

fn classification(input: &mut &str) -> winnow::ModalResult<bool> {
    alt(("U:".value(true), "S:".value(false))).parse_next(input)
}

fn name(input: &mut &str) -> winnow::ModalResult<String> {
    take_while(1.., |c: char| c != '+')
        .map(str::to_string)
        .parse_next(input)
}

/// Parse a role string.
///
/// # Errors
///
/// Returns [`ParseError::MalformedRole`] if the string does not match the
/// role grammar.
pub fn parse_role(text: &str) -> Result<RoleDecl, ParseError> {
    (direction, opt(classification), name)
        .map(|(is_initiator, classification, name)| RoleDecl {
            is_initiator,
            is_user: classification.unwrap_or(false),
            name,
        })
        .parse(text)
        .map_err(|_| ParseError::MalformedRole(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_initiator_defaults_to_service() {
        let role = parse_role("S:Alice").unwrap();
        assert_eq!(
            role,
            RoleDecl {
                is_initiator: true,
                is_user: false,
                name: "Alice".to_string(),
            }
        );
    }

    #[test]
    fn test_receiver_user() {
        let role = parse_role("R:U:Bob").unwrap();
        assert!(!role.is_initiator);
        assert!(role.is_user);
        assert_eq!(role.name, "Bob");
    }

    #[test]
    fn test_initiator_user() {
        let role = parse_role("S:U:Alice").unwrap();
        assert!(role.is_initiator);
        assert!(role.is_user);
    }

    #[test]
    fn test_explicit_service_classification() {
        let role = parse_role("R:S:Registry").unwrap();
        assert!(!role.is_user);
        assert_eq!(role.name, "Registry");
    }

    #[test]
    fn test_name_starting_with_s_is_not_a_classification() {
        // "Sally" must not be read as an `S:` classification.
        let role = parse_role("S:Sally").unwrap();
        assert!(!role.is_user);
        assert_eq!(role.name, "Sally");
    }

    #[test]
    fn test_rejects_malformed_roles() {
        for bad in ["Alice", "X:Alice", "S:", "S:U:", "S:Bob+x", "", "s:Alice"] {
            assert!(parse_role(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    proptest! {
        #[test]
        fn prop_well_formed_roles_parse(name in "[a-zA-Z0-9 _-]{1,20}") {
            let role = parse_role(&format!("R:U:{name}")).unwrap();
            prop_assert_eq!(role.name, name);
            prop_assert!(role.is_user);
            prop_assert!(!role.is_initiator);
        }
    }
}
