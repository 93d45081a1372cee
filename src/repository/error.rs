// ==========================================
// 考场座位分配系统 - 仓储层错误类型
// ==========================================
// 约束: 约束失败按 SQLite 扩展错误码归类，不依赖错误文本
// ==========================================

use rusqlite::ffi;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity} '{id}' 不存在")]
    NotFound { entity: String, id: String },

    // ===== 连接 / 事务 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 约束 =====
    #[error("重复记录: {0}")]
    DuplicateKey(String),

    #[error("关联记录不存在: {0}")]
    ForeignKeyViolation(String),

    #[error("取值违反约束: {0}")]
    ConstraintViolation(String),

    // ===== 已存数据无法还原 =====
    #[error("字段 {field} 的存储值无效: {message}")]
    FieldValueError { field: String, message: String },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let text = err.to_string();
                match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        RepositoryError::DuplicateKey(text)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::ForeignKeyViolation(text),
                    _ => RepositoryError::ConstraintViolation(text),
                }
            }
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::CannotOpen =>
            {
                RepositoryError::DatabaseConnectionError(err.to_string())
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// 考生附加列以 JSON 存储
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::FieldValueError {
            field: "extra_json".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT UNIQUE);
            CREATE TABLE child (
                parent_id INTEGER REFERENCES parent(id),
                n INTEGER CHECK (n > 0)
            );
            INSERT INTO parent (id, name) VALUES (1, 'A');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_constraint_failures_classified() {
        let conn = conn();

        let dup = conn
            .execute("INSERT INTO parent (id, name) VALUES (2, 'A')", [])
            .unwrap_err();
        assert!(matches!(RepositoryError::from(dup), RepositoryError::DuplicateKey(_)));

        let fk = conn
            .execute("INSERT INTO child (parent_id, n) VALUES (9, 1)", [])
            .unwrap_err();
        assert!(matches!(RepositoryError::from(fk), RepositoryError::ForeignKeyViolation(_)));

        let check = conn
            .execute("INSERT INTO child (parent_id, n) VALUES (1, 0)", [])
            .unwrap_err();
        assert!(matches!(RepositoryError::from(check), RepositoryError::ConstraintViolation(_)));
    }
}
