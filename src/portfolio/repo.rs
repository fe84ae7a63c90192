use sqlx::SqlitePool;

use super::repo_types::{Portfolio, PortfolioFields};
use crate::error::AppError;

// `fetch_all` steps an upsert's RETURNING statement to completion. With
// `fetch_one` the statement is left open and its implicit transaction is not
// committed, so reads on other pooled connections miss the write.
fn returned_id(rows: Vec<(i64,)>) -> Result<i64, AppError> {
    rows.first()
        .map(|(id,)| *id)
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))
}

impl Portfolio {
    /// Store a complete submission: insert the user's row, or overwrite
    /// every field of the existing one.
    pub async fn submit(
        db: &SqlitePool,
        user_id: i64,
        fields: &PortfolioFields,
        photo_path: &str,
    ) -> Result<i64, AppError> {
        let work_experience = fields.work_experience_json()?;
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO portfolios (
                user_id, full_name, contact_info, photo_path, bio, soft_skills, technical_skills,
                institute, degree, year, grade, work_experience, projects
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                full_name = excluded.full_name,
                contact_info = excluded.contact_info,
                photo_path = excluded.photo_path,
                bio = excluded.bio,
                soft_skills = excluded.soft_skills,
                technical_skills = excluded.technical_skills,
                institute = excluded.institute,
                degree = excluded.degree,
                year = excluded.year,
                grade = excluded.grade,
                work_experience = excluded.work_experience,
                projects = excluded.projects
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&fields.full_name)
        .bind(&fields.contact_info)
        .bind(photo_path)
        .bind(&fields.bio)
        .bind(&fields.soft_skills)
        .bind(&fields.technical_skills)
        .bind(&fields.institute)
        .bind(&fields.degree)
        .bind(&fields.year)
        .bind(&fields.grade)
        .bind(work_experience)
        .bind(&fields.projects)
        .fetch_all(db)
        .await?;
        returned_id(rows)
    }

    /// Partial save: fields absent from `fields` keep their stored value.
    /// Creates the row when the user has none yet. The photo is never
    /// touched here.
    pub async fn save_progress(
        db: &SqlitePool,
        user_id: i64,
        fields: &PortfolioFields,
    ) -> Result<i64, AppError> {
        let work_experience = fields.work_experience_json()?;
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO portfolios (
                user_id, full_name, contact_info, bio, soft_skills, technical_skills,
                institute, degree, year, grade, work_experience, projects
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                full_name = COALESCE(excluded.full_name, portfolios.full_name),
                contact_info = COALESCE(excluded.contact_info, portfolios.contact_info),
                bio = COALESCE(excluded.bio, portfolios.bio),
                soft_skills = COALESCE(excluded.soft_skills, portfolios.soft_skills),
                technical_skills = COALESCE(excluded.technical_skills, portfolios.technical_skills),
                institute = COALESCE(excluded.institute, portfolios.institute),
                degree = COALESCE(excluded.degree, portfolios.degree),
                year = COALESCE(excluded.year, portfolios.year),
                grade = COALESCE(excluded.grade, portfolios.grade),
                work_experience = COALESCE(excluded.work_experience, portfolios.work_experience),
                projects = COALESCE(excluded.projects, portfolios.projects)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&fields.full_name)
        .bind(&fields.contact_info)
        .bind(&fields.bio)
        .bind(&fields.soft_skills)
        .bind(&fields.technical_skills)
        .bind(&fields.institute)
        .bind(&fields.degree)
        .bind(&fields.year)
        .bind(&fields.grade)
        .bind(work_experience)
        .bind(&fields.projects)
        .fetch_all(db)
        .await?;
        returned_id(rows)
    }

    pub async fn load_for_user(db: &SqlitePool, user_id: i64) -> Result<Option<Portfolio>, sqlx::Error> {
        sqlx::query_as::<_, Portfolio>(
            r#"
            SELECT id, user_id, full_name, contact_info, photo_path, bio, soft_skills,
                   technical_skills, institute, degree, year, grade, work_experience, projects
            FROM portfolios
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
    }
}
