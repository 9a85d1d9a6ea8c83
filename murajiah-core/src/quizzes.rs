use thiserror::Error;

use crate::{
    Database, DatabaseError, NewQuiz, PlatformContext, PrimaryKey, QuizData, UpdatedQuiz,
};

pub struct QuizLibrary<Db> {
    context: PlatformContext<Db>,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Only the quiz owner or a moderator can change this quiz")]
    NotQuizOwner,
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> QuizLibrary<Db>
where
    Db: Database,
{
    pub fn new(context: &PlatformContext<Db>) -> Self {
        Self {
            context: context.clone(),
        }
    }

    pub async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<QuizData, DatabaseError> {
        self.context.database.create_quiz(new_quiz).await
    }

    pub async fn quiz_by_id(&self, quiz_id: PrimaryKey) -> Result<QuizData, DatabaseError> {
        self.context.database.quiz_by_id(quiz_id).await
    }

    pub async fn list_quizzes(&self) -> Result<Vec<QuizData>, DatabaseError> {
        self.context.database.list_quizzes().await
    }

    /// Updates a quiz on behalf of `caller`, who must own it or hold
    /// moderation rights
    pub async fn update_quiz(
        &self,
        caller: PrimaryKey,
        updated_quiz: UpdatedQuiz,
    ) -> Result<QuizData, QuizError> {
        self.ensure_can_change(caller, updated_quiz.id).await?;

        self.context
            .database
            .update_quiz(updated_quiz)
            .await
            .map_err(QuizError::Db)
    }

    /// Deletes a quiz on behalf of `caller`, who must own it or hold
    /// moderation rights
    pub async fn delete_quiz(&self, caller: PrimaryKey, quiz_id: PrimaryKey) -> Result<(), QuizError> {
        self.ensure_can_change(caller, quiz_id).await?;

        self.context
            .database
            .delete_quiz(quiz_id)
            .await
            .map_err(QuizError::Db)
    }

    async fn ensure_can_change(&self, caller: PrimaryKey, quiz_id: PrimaryKey) -> Result<(), QuizError> {
        let quiz = self
            .context
            .database
            .quiz_by_id(quiz_id)
            .await
            .map_err(QuizError::Db)?;

        if quiz.owner_id != caller && !self.context.roles.has_moderation_rights(caller).await {
            return Err(QuizError::NotQuizOwner);
        }

        Ok(())
    }
}
