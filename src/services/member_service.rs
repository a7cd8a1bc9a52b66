use crate::entities::member_entity as members;
use crate::error::{AppError, AppResult};
use crate::models::{MemberPatch, MemberResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};

pub const NICKNAME_MAX_CHARS: usize = 20;

#[derive(Clone)]
pub struct MemberService {
    pool: DatabaseConnection,
}

impl MemberService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_member(&self, member_id: i64) -> AppResult<MemberResponse> {
        let member = self.find_member(member_id).await?;
        Ok(member.into())
    }

    /// 更新会员资料，只覆盖 patch 中出现的字段
    pub async fn update_member(
        &self,
        member_id: i64,
        patch: MemberPatch,
    ) -> AppResult<MemberResponse> {
        let member = self.find_member(member_id).await?;

        if patch.nickname.is_none() && patch.birth.is_none() && patch.gender.is_none() {
            return Ok(member.into());
        }

        let mut model = member.into_active_model();
        if let Some(nickname) = patch.nickname {
            let nickname = validate_nickname(&nickname)?;
            model.nickname = Set(nickname);
        }
        if let Some(birth) = patch.birth {
            model.birth = Set(Some(birth));
        }
        if let Some(gender) = patch.gender {
            model.gender = Set(Some(gender));
        }

        let updated = model.update(&self.pool).await?;
        log::info!("Member {} updated profile", updated.id);
        Ok(updated.into())
    }

    async fn find_member(&self, member_id: i64) -> AppResult<members::Model> {
        members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
    }
}

/// 昵称去掉首尾空白后长度须在 1..=20 个字符之间
pub fn validate_nickname(nickname: &str) -> AppResult<String> {
    let trimmed = nickname.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > NICKNAME_MAX_CHARS {
        return Err(AppError::ValidationError(format!(
            "nickname must be 1 to {NICKNAME_MAX_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_nickname() {
        assert_eq!(validate_nickname("  라떼  ").unwrap(), "라떼");
        assert!(validate_nickname("   ").is_err());
        assert!(validate_nickname(&"가".repeat(20)).is_ok());
        assert!(validate_nickname(&"가".repeat(21)).is_err());
    }
}
