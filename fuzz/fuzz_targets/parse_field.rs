#![no_main]

use arbitrary::Arbitrary;
use eagle_types::ColumnType;
use libfuzzer_sys::fuzz_target;

/// A type name paired with a raw field.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    type_name: String,
    field: String,
}

fuzz_target!(|input: FuzzInput| {
    if let Ok(ty) = ColumnType::from_type_name(&input.type_name) {
        if let Ok(value) = ty.parse_field(&input.field) {
            assert!(value.matches(ty));
        }
    }
});
