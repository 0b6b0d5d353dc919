//! Strategies for built-in objects with internal state: errors, patterns and
//! dates.

use replica_core::{DateValue, ErrorValue, Pattern, ReplicaError, Value};

use crate::dispatch::mismatch;

/// A new error with the same name and message. Stack text and custom fields
/// stay behind.
pub fn duplicate_error(value: &Value) -> Result<Value, ReplicaError> {
    let Value::Error(src) = value else {
        return Err(mismatch("error", value));
    };
    Ok(Value::error(ErrorValue::new(src.name(), src.message())))
}

/// Recompile from source and flags. Match state is not carried, so the copy
/// starts searching from index 0.
pub fn duplicate_regexp(value: &Value) -> Result<Value, ReplicaError> {
    let Value::RegExp(src) = value else {
        return Err(mismatch("regexp", value));
    };
    let copy = Pattern::new(src.source(), &src.flags().to_string())?;
    Ok(Value::regexp(copy))
}

pub fn duplicate_date(value: &Value) -> Result<Value, ReplicaError> {
    let Value::Date(src) = value else {
        return Err(mismatch("date", value));
    };
    let copy = match src.time() {
        Some(millis) => DateValue::from_millis(millis),
        None => DateValue::invalid(),
    };
    Ok(Value::date(copy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_copy_drops_stack_and_fields() {
        let src = ErrorValue::new("RangeError", "too far").with_stack("at f (x.js:1:1)");
        src.set_property("code", Value::string("E_FAR"));
        let copy = duplicate_error(&Value::error(src)).unwrap();
        let Value::Error(copy) = copy else {
            panic!("expected an error");
        };
        assert_eq!(copy.name(), "RangeError");
        assert_eq!(copy.message(), "too far");
        assert_eq!(copy.stack(), None);
        assert_eq!(copy.property_count(), 0);
    }

    #[test]
    fn test_regexp_copy_resets_last_index() {
        let src = Pattern::new("o", "gi").unwrap();
        assert_eq!(src.exec("foo"), Some("o"));
        assert_eq!(src.last_index(), 2);
        let copy = duplicate_regexp(&Value::regexp(src)).unwrap();
        let Value::RegExp(copy) = copy else {
            panic!("expected a pattern");
        };
        assert_eq!(copy.last_index(), 0);
        assert_eq!(copy.source(), "o");
        assert_eq!(copy.flags().to_string(), "gi");
        assert!(copy.is_match("O"));
    }

    #[test]
    fn test_date_copy_is_independent() {
        let original = Value::date(DateValue::from_millis(1_700_000_000_000));
        let copy = duplicate_date(&original).unwrap();
        let (Value::Date(a), Value::Date(b)) = (&original, &copy) else {
            panic!("expected dates");
        };
        b.set_time(Some(0));
        assert_eq!(a.time(), Some(1_700_000_000_000));
        assert_eq!(b.time(), Some(0));
    }

    #[test]
    fn test_invalid_date_stays_invalid() {
        let copy = duplicate_date(&Value::date(DateValue::invalid())).unwrap();
        assert!(matches!(copy, Value::Date(d) if !d.is_valid()));
    }
}
