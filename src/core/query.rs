use crate::models::StudentProfile;

/// Build the free-text query embedded for the similarity search
///
/// The index was built from Portuguese opportunity descriptions, so the
/// sentence stays in Portuguese. Only schooling level, interest areas and
/// description take part; the same profile always yields the same text.
pub fn build_query(profile: &StudentProfile) -> String {
    format!(
        "Me encontro no nivel de escolaridade {}. Tenho interesse em {}. Sobre mim: {}",
        profile.schooling_level.trim(),
        profile.interest_areas.join(", "),
        profile.description.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mobility;

    fn profile() -> StudentProfile {
        StudentProfile {
            id: "1".to_string(),
            schooling_level: "Ensino Médio".to_string(),
            interest_areas: vec!["Tecnologia".to_string(), "Música".to_string()],
            description: "Gosto de robótica".to_string(),
            mobility: Mobility::City,
            city: "Recife".to_string(),
            state: "PE".to_string(),
        }
    }

    #[test]
    fn test_query_combines_three_fields() {
        let query = build_query(&profile());
        assert_eq!(
            query,
            "Me encontro no nivel de escolaridade Ensino Médio. Tenho interesse em Tecnologia, Música. Sobre mim: Gosto de robótica"
        );
    }

    #[test]
    fn test_query_ignores_location() {
        let mut other = profile();
        other.city = "Natal".to_string();
        other.mobility = Mobility::None;
        assert_eq!(build_query(&profile()), build_query(&other));
    }
}
