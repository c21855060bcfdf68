//! {{CRATE_DESCRIPTION}}

pub fn greeting() -> String {
    format!("Hello from {{NAME}}!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        assert!(greeting().contains("Hello"));
    }
}
