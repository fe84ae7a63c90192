use serde::Serialize;
use sqlx::FromRow;

/// Portfolio record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Portfolio {
    pub id: i64,
    pub user_id: i64,
    pub full_name: Option<String>,
    pub contact_info: Option<String>,
    pub photo_path: Option<String>, // uploads/<file>
    pub bio: Option<String>,
    pub soft_skills: Option<String>,
    pub technical_skills: Option<String>,
    pub institute: Option<String>,
    pub degree: Option<String>,
    pub year: Option<String>,
    pub grade: Option<String>,
    pub work_experience: Option<String>, // JSON array of strings
    pub projects: Option<String>,
}

/// Editable portfolio fields as submitted by the form. `None` means the
/// field was absent from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioFields {
    pub full_name: Option<String>,
    pub contact_info: Option<String>,
    pub bio: Option<String>,
    pub soft_skills: Option<String>,
    pub technical_skills: Option<String>,
    pub institute: Option<String>,
    pub degree: Option<String>,
    pub year: Option<String>,
    pub grade: Option<String>,
    pub work_experience: Option<Vec<String>>,
    pub projects: Option<String>,
}

/// Shape returned by GET /load-progress.
#[derive(Debug, Serialize)]
pub struct PortfolioView {
    pub id: i64,
    pub user_id: i64,
    pub full_name: Option<String>,
    pub contact_info: Option<String>,
    pub photo_path: Option<String>,
    pub bio: Option<String>,
    pub soft_skills: Option<String>,
    pub technical_skills: Option<String>,
    pub institute: Option<String>,
    pub degree: Option<String>,
    pub year: Option<String>,
    pub grade: Option<String>,
    pub work_experience: Vec<String>,
    pub projects: Option<String>,
}

impl From<Portfolio> for PortfolioView {
    fn from(p: Portfolio) -> Self {
        let work_experience = match p.work_experience {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|_| vec![raw]),
            None => Vec::new(),
        };
        Self {
            id: p.id,
            user_id: p.user_id,
            full_name: p.full_name,
            contact_info: p.contact_info,
            photo_path: p.photo_path,
            bio: p.bio,
            soft_skills: p.soft_skills,
            technical_skills: p.technical_skills,
            institute: p.institute,
            degree: p.degree,
            year: p.year,
            grade: p.grade,
            work_experience,
            projects: p.projects,
        }
    }
}
