use crate::entity::prelude::*;
use crate::entity::users;
use sea_orm::*;

/// 用户数据仓库
pub struct UsersRepository;

impl UsersRepository {
    /// 创建用户
    pub async fn insert(
        db: &DatabaseConnection,
        display_name: &str,
        email: &str,
        role: UserRole,
        developer_status: DeveloperStatus,
    ) -> Result<users::Model, DbErr> {
        let user = users::ActiveModel {
            id: NotSet,
            display_name: Set(display_name.to_string()),
            email: Set(email.to_string()),
            role: Set(role),
            developer_status: Set(developer_status),
            created_at: Set(Some(chrono::Utc::now().timestamp())),
        };
        user.insert(db).await
    }

    /// 根据 ID 查询用户
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<users::Model>, DbErr> {
        Users::find_by_id(id).one(db).await
    }

    /// 获取所有已通过审核的开发者
    pub async fn find_approved_developers(
        db: &DatabaseConnection,
    ) -> Result<Vec<users::Model>, DbErr> {
        Users::find()
            .filter(users::Column::DeveloperStatus.eq(DeveloperStatus::Approved))
            .order_by_asc(users::Column::DisplayName)
            .all(db)
            .await
    }

    /// 更新开发者状态
    pub async fn set_developer_status(
        db: &DatabaseConnection,
        id: i32,
        status: DeveloperStatus,
    ) -> Result<users::Model, DbErr> {
        let user = Users::find_by_id(id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("User record not found".to_string()))?;

        let mut active: users::ActiveModel = user.into();
        active.developer_status = Set(status);
        active.update(db).await
    }
}
