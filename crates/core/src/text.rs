use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lowercases and strips accents so that "Mañana" and "manana" compare equal.
pub fn normalize(text: &str) -> String {
    text.nfd().filter(|ch| !is_combining_mark(*ch)).collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize("¿Qué tengo MAÑANA?"), "¿que tengo manana?");
        assert_eq!(normalize("Miércoles y Sábado"), "miercoles y sabado");
        assert_eq!(normalize("Reunión"), "reunion");
    }
}
