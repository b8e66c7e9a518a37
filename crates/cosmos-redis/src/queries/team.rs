//! Team member queries over Redis hashes.

use crate::broadcast::{self, ChangeEvent, ChangeKind, Table};
use crate::client::{RedisError, RedisPool, RedisResult};
use crate::queries::decode_listed;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

const TEAM_KEY: &str = "cosmos:team:all";

fn member_key(id: &str) -> String {
    format!("cosmos:member:{}", id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberRow {
    pub id: String,
    pub name: String,
    pub role: String,
}

async fn save_member(pool: &RedisPool, row: &TeamMemberRow) -> RedisResult<()> {
    let mut conn = pool.conn();
    conn.hset::<_, _, _, ()>(member_key(&row.id), "data", serde_json::to_string(row)?).await?;
    conn.sadd::<_, _, ()>(TEAM_KEY, &row.id).await?;
    Ok(())
}

pub async fn create_member(pool: &RedisPool, id: &str, name: &str, role: &str) -> RedisResult<TeamMemberRow> {
    let row = TeamMemberRow {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
    };
    save_member(pool, &row).await?;
    broadcast::announce(pool, &ChangeEvent::new(Table::Team, ChangeKind::Insert, id)).await;
    Ok(row)
}

pub async fn get_member(pool: &RedisPool, member_id: &str) -> RedisResult<TeamMemberRow> {
    let mut conn = pool.conn();
    let json: Option<String> = conn.hget(member_key(member_id), "data").await?;
    match json {
        Some(j) => Ok(serde_json::from_str(&j)?),
        None => Err(RedisError::NotFound(format!("Team member not found: {}", member_id))),
    }
}

/// All members ordered by name.
pub async fn list_members(pool: &RedisPool) -> RedisResult<Vec<TeamMemberRow>> {
    let mut conn = pool.conn();
    let ids: Vec<String> = conn.smembers(TEAM_KEY).await?;
    let mut members = Vec::with_capacity(ids.len());
    for id in ids {
        let json: Option<String> = conn.hget(member_key(&id), "data").await?;
        let Some(j) = json else { continue };
        if let Some(row) = decode_listed::<TeamMemberRow>("team", &id, &j) {
            members.push(row);
        }
    }
    members.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(members)
}

pub async fn update_member(pool: &RedisPool, member_id: &str, name: &str, role: &str) -> RedisResult<TeamMemberRow> {
    let mut row = get_member(pool, member_id).await?;
    row.name = name.to_string();
    row.role = role.to_string();
    save_member(pool, &row).await?;
    broadcast::announce(pool, &ChangeEvent::new(Table::Team, ChangeKind::Update, member_id)).await;
    Ok(row)
}

pub async fn delete_member(pool: &RedisPool, member_id: &str) -> RedisResult<()> {
    let mut conn = pool.conn();
    let removed: i64 = conn.del(member_key(member_id)).await?;
    conn.srem::<_, _, ()>(TEAM_KEY, member_id).await?;
    if removed == 0 {
        return Err(RedisError::NotFound(format!("Team member not found: {}", member_id)));
    }
    broadcast::announce(pool, &ChangeEvent::new(Table::Team, ChangeKind::Delete, member_id)).await;
    Ok(())
}
