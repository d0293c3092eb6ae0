use bson::doc;
use bson::oid::ObjectId;
use bson::Document;

use super::{NewUser, User};
use crate::data::store::{
    filter, DocumentStore, InsertOutcome, Page, UpdateOutcome, USER_COLLECTION_NAME,
};
use crate::resp::problem::{problems, Problem};
use crate::role::Role;

#[allow(async_fn_in_trait)]
pub trait UserDbExt {
    /// Inserts the user unless one with the same email already exists.
    async fn create_user(&self, new_user: NewUser) -> Result<InsertOutcome, Problem>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>, Problem>;

    async fn list_users(&self, page: Option<Page>) -> Result<Vec<Document>, Problem>;

    /// Stored role of the user with `email`. Unknown users are students.
    async fn resolve_role(&self, email: &str) -> Result<Role, Problem>;

    async fn promote_to_admin(&self, id: ObjectId) -> Result<UpdateOutcome, Problem>;
}

impl UserDbExt for dyn DocumentStore {
    async fn create_user(&self, new_user: NewUser) -> Result<InsertOutcome, Problem> {
        if new_user.email.trim().is_empty() {
            return Err(problems::bad_field("email", "An email address is required."));
        }

        let email = new_user.email.clone();
        let user = User::from(new_user);
        let inserted = self
            .insert_if_absent(
                USER_COLLECTION_NAME,
                filter::by_email(email.as_str()),
                bson::to_document(&user)?,
            )
            .await?;

        match inserted {
            Some(id) => Ok(InsertOutcome::inserted(&id)),
            None => {
                tracing::debug!("user {} already exists", email);
                Ok(InsertOutcome::skipped("user already exists"))
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>, Problem> {
        self.find_one(USER_COLLECTION_NAME, filter::by_email(email))
            .await
    }

    async fn list_users(&self, page: Option<Page>) -> Result<Vec<Document>, Problem> {
        self.find(USER_COLLECTION_NAME, doc! {}, page).await
    }

    async fn resolve_role(&self, email: &str) -> Result<Role, Problem> {
        let user = self.find_user_by_email(email).await?;
        let role = Role::parse(user.as_ref().and_then(|u| u.get_str("role").ok()));
        tracing::debug!("resolved role of {}: {}", email, role);
        Ok(role)
    }

    async fn promote_to_admin(&self, id: ObjectId) -> Result<UpdateOutcome, Problem> {
        self.update_one(
            USER_COLLECTION_NAME,
            filter::by_id(id),
            doc! { "role": Role::Admin.as_str() },
        )
        .await
    }
}
