//! Student repository for tenant-scoped student lookups.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{guardian_links, students};

/// Student repository for read operations.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    db: DatabaseConnection,
}

impl StudentRepository {
    /// Creates a new student repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a student by id within a school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<students::Model>, DbErr> {
        students::Entity::find_by_id(student_id)
            .filter(students::Column::SchoolId.eq(school_id))
            .one(&self.db)
            .await
    }

    /// Returns the ids of students linked to a guardian principal.
    ///
    /// Used to restrict what a PARENT caller may read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn linked_student_ids(
        &self,
        school_id: Uuid,
        guardian_user_id: Uuid,
    ) -> Result<Vec<Uuid>, DbErr> {
        let links = guardian_links::Entity::find()
            .filter(guardian_links::Column::SchoolId.eq(school_id))
            .filter(guardian_links::Column::GuardianUserId.eq(guardian_user_id))
            .all(&self.db)
            .await?;

        Ok(links.into_iter().map(|link| link.student_id).collect())
    }
}
