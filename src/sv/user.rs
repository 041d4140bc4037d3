use crate::{
  model::{self, Collection, UserRole},
  prelude::*,
  store::{Store, upsert_into},
};

pub struct User<'a> {
  store: &'a Store,
}

impl<'a> User<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn register(
    &self,
    username: &str,
    phone: &str,
    password: &str,
  ) -> Result<model::User> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
      return Err(Error::InvalidArgs(
        "Username and password are required".into(),
      ));
    }

    let mut tx = self.store.begin().await;
    let mut users = tx.load::<model::User>().await?;
    if users.iter().any(|user| user.username == username) {
      return Err(Error::UsernameTaken);
    }

    let user = model::User::new(username, phone.trim(), password);
    users.push(user.clone());
    tx.stage(&users)?;
    tx.commit().await?;

    info!(id = %user.id, username, "user registered");
    Ok(user)
  }

  pub async fn login(
    &self,
    username: &str,
    password: &str,
  ) -> Result<model::User> {
    let user = self
      .find_by_username(username.trim())
      .await?
      .filter(|user| user.check_password(password))
      .ok_or(Error::InvalidCredentials)?;

    if user.is_banned {
      return Err(Error::Banned);
    }
    Ok(user)
  }

  pub async fn find_by_username(
    &self,
    username: &str,
  ) -> Result<Option<model::User>> {
    let users = self.store.list::<model::User>().await?;
    Ok(users.into_iter().find(|user| user.username == username))
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<model::User>> {
    self.store.get(id).await
  }

  pub async fn all(&self) -> Result<Vec<model::User>> {
    self.store.list().await
  }

  /// Users whose username or phone contains `query`.
  pub async fn search(&self, query: &str) -> Result<Vec<model::User>> {
    let users = self.store.list::<model::User>().await?;
    Ok(
      users
        .into_iter()
        .filter(|user| user.username.contains(query) || user.phone.contains(query))
        .collect(),
    )
  }

  /// Saves profile fields. The wallet balance and role of an existing user
  /// are kept as stored; balances move only through [`super::Wallet`] and
  /// roles only through [`User::set_role`]. The super admin keeps its
  /// username.
  pub async fn save(&self, mut user: model::User) -> Result<()> {
    let mut tx = self.store.begin().await;
    let mut users = tx.load::<model::User>().await?;

    match users.iter().find(|u| u.id == user.id) {
      Some(existing) => {
        user.wallet_balance = existing.wallet_balance;
        user.role = existing.role;
        if existing.role == UserRole::SuperAdmin {
          user.username = existing.username.clone();
        }
      }
      None if user.role == UserRole::SuperAdmin => {
        return Err(Error::Forbidden(
          "The super admin role cannot be assigned".into(),
        ));
      }
      None => {}
    }
    if users.iter().any(|u| u.id != user.id && u.username == user.username) {
      return Err(Error::UsernameTaken);
    }

    upsert_into(&mut users, user);
    tx.stage(&users)?;
    tx.commit().await
  }

  pub async fn set_banned(
    &self,
    user_id: &str,
    banned: bool,
  ) -> Result<model::User> {
    let user = self
      .store
      .update::<model::User, _>(user_id, |user| {
        if user.role == UserRole::SuperAdmin {
          return Err(Error::Forbidden("The super admin cannot be banned".into()));
        }
        user.is_banned = banned;
        Ok(user.clone())
      })
      .await?;

    info!(user_id, banned, "ban status changed");
    Ok(user)
  }

  /// Promotes or demotes `user_id`. Only the super admin may do this, and
  /// the super admin role itself can be neither granted nor taken away.
  pub async fn set_role(
    &self,
    actor_id: &str,
    user_id: &str,
    role: UserRole,
  ) -> Result<model::User> {
    let actor = self
      .by_id(actor_id)
      .await?
      .ok_or_else(|| Error::not_found(Collection::Users, actor_id))?;

    if actor.role != UserRole::SuperAdmin {
      return Err(Error::Forbidden("Only the super admin can change roles".into()));
    }
    if role == UserRole::SuperAdmin {
      return Err(Error::Forbidden("The super admin role cannot be assigned".into()));
    }

    self
      .store
      .update::<model::User, _>(user_id, |user| {
        if user.role == UserRole::SuperAdmin {
          return Err(Error::Forbidden(
            "The super admin role cannot be changed".into(),
          ));
        }
        user.role = role;
        Ok(user.clone())
      })
      .await
  }
}
