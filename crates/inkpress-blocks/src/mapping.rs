//! Static key-to-field tables used by [`MetaBlock::map_to`](crate::MetaBlock::map_to).

/// Typed setter for one field.
enum Setter<T> {
    Str(fn(&mut T, String)),
    Int(fn(&mut T, i64)),
    Bool(fn(&mut T, bool)),
}

/// Maps one metadata key onto a field of `T`, converting the stored string
/// to the field's declared type.
pub struct Field<T> {
    key: &'static str,
    setter: Setter<T>,
}

impl<T> Field<T> {
    pub const fn string(key: &'static str, set: fn(&mut T, String)) -> Self {
        Self {
            key,
            setter: Setter::Str(set),
        }
    }

    pub const fn int(key: &'static str, set: fn(&mut T, i64)) -> Self {
        Self {
            key,
            setter: Setter::Int(set),
        }
    }

    pub const fn bool(key: &'static str, set: fn(&mut T, bool)) -> Self {
        Self {
            key,
            setter: Setter::Bool(set),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Convert `value` and store it; values that do not convert leave the field as is.
    pub fn apply(&self, target: &mut T, value: &str) {
        match self.setter {
            Setter::Str(set) => set(target, value.to_string()),
            Setter::Int(set) => match value.trim().parse() {
                Ok(n) => set(target, n),
                Err(_) => tracing::warn!("Ignoring non-integer value {:?} for {}", value, self.key),
            },
            Setter::Bool(set) => match parse_bool(value) {
                Some(b) => set(target, b),
                None => tracing::warn!("Ignoring non-boolean value {:?} for {}", value, self.key),
            },
        }
    }
}

/// Types that can be populated from a metadata namespace.
pub trait MapFromMeta: Sized + 'static {
    /// The key table, built once per type.
    fn fields() -> &'static [Field<Self>];
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}
