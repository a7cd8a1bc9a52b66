use crate::entities::{Gender, member_entity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub id: i64,
    #[schema(example = "kakao_2981231")]
    pub uid: String,
    #[schema(example = "아메리카노")]
    pub nickname: String,
    pub birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl From<member_entity::Model> for MemberResponse {
    fn from(m: member_entity::Model) -> Self {
        Self {
            id: m.id,
            uid: m.uid,
            nickname: m.nickname,
            birth: m.birth,
            gender: m.gender,
        }
    }
}

/// 会员资料的部分更新：只覆盖出现的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MemberPatch {
    pub nickname: Option<String>,
    #[schema(example = "1995-03-14")]
    pub birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}
