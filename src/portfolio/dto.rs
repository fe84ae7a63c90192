use super::repo_types::PortfolioFields;

/// Form field carrying the uploaded photo.
pub const PHOTO_FIELD: &str = "photo";

impl PortfolioFields {
    /// Build from decoded form pairs, in either urlencoded or multipart
    /// bodies. `work-experience` may repeat; every other field keeps its
    /// last value. Unknown names are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = Self::default();
        for (name, value) in pairs {
            let value = value.into();
            let slot = match name.as_ref() {
                "full-name" => &mut fields.full_name,
                "contact-info" => &mut fields.contact_info,
                "bio" => &mut fields.bio,
                "soft-skills" => &mut fields.soft_skills,
                "technical-skills" => &mut fields.technical_skills,
                "institute" => &mut fields.institute,
                "degree" => &mut fields.degree,
                "year" => &mut fields.year,
                "grade" => &mut fields.grade,
                "projects" => &mut fields.projects,
                "work-experience" | "work-experience[]" => {
                    fields.work_experience.get_or_insert_with(Vec::new).push(value);
                    continue;
                }
                _ => continue,
            };
            *slot = Some(value);
        }
        fields
    }

    pub fn work_experience_json(&self) -> anyhow::Result<Option<String>> {
        self.work_experience
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(Into::into)
    }
}
