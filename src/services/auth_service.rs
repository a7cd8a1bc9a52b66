use crate::entities::member_entity as members;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest};
use crate::services::member_service::validate_nickname;
use crate::utils::JwtService;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 按 uid 登录；会员不存在时用请求中的资料完成注册
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let uid = request.uid.trim();
        if uid.is_empty() {
            return Err(AppError::ValidationError("uid must not be empty".to_string()));
        }

        let existing = members::Entity::find()
            .filter(members::Column::Uid.eq(uid))
            .one(&self.pool)
            .await?;

        let member = match existing {
            Some(member) => member,
            None => {
                let nickname = request.nickname.as_deref().ok_or_else(|| {
                    AppError::ValidationError(
                        "nickname is required on first sign-in".to_string(),
                    )
                })?;
                let nickname = validate_nickname(nickname)?;

                let member = members::ActiveModel {
                    uid: Set(uid.to_string()),
                    nickname: Set(nickname),
                    birth: Set(request.birth),
                    gender: Set(request.gender),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?;
                log::info!("Registered member {} for uid {}", member.id, member.uid);
                member
            }
        };

        self.issue_tokens(member)
    }

    /// 用 refresh token 换取新的 token 对
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self
            .jwt_service
            .verify_refresh_token(refresh_token)
            .map_err(|_| AppError::AuthError("Invalid refresh token".to_string()))?;
        let member_id = claims.member_id()?;

        let member = members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Member no longer exists".to_string()))?;

        self.issue_tokens(member)
    }

    fn issue_tokens(&self, member: members::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(member.id, &member.uid)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(member.id, &member.uid)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
            member: member.into(),
        })
    }
}
