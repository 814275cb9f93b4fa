//! SQL text for the query-side `PgPool`, targeting Postgres with `$n`
//! placeholders.
//!
//! Registration's uniqueness check and [`FIND_LIVE_CLIENT_ID_BY_IK`] are
//! scoped to *live* clients (`deleted = false`): `ik_cert` is unique across
//! live clients, not across every row ever inserted, so a soft-deleted
//! client's certificate doesn't keep blocking re-registration forever. See
//! `DESIGN.md`.

pub const INSERT_CLIENT: &str =
    "INSERT INTO client(regtime, deleted, info, ikcert) VALUES ($1, $2, $3, $4) RETURNING id";
pub const FIND_ALL_LIVE_CLIENTS: &str =
    "SELECT id, regtime, deleted, info, ikcert FROM client WHERE deleted = false";
pub const FIND_CLIENT_BY_ID: &str =
    "SELECT id, regtime, deleted, info, ikcert FROM client WHERE id = $1";
pub const FIND_LIVE_CLIENT_ID_BY_IK: &str =
    "SELECT id FROM client WHERE ikcert = $1 AND deleted = false";
pub const FIND_CLIENT_BY_IK: &str =
    "SELECT id, regtime, deleted, info, ikcert FROM client WHERE ikcert = $1";
pub const FIND_CLIENTS_BY_INFO: &str =
    "SELECT id, regtime, deleted, info, ikcert FROM client WHERE info @> $1";
pub const UNREGISTER_CLIENT_BY_ID: &str = "UPDATE client SET deleted = true WHERE id = $1";

pub const FIND_REPORTS_BY_CLIENT_ID: &str = "SELECT id, clientid, createtime, validated, trusted \
    FROM report WHERE clientid = $1 ORDER BY createtime ASC";
pub const FIND_REPORT_BY_ID: &str = "SELECT id, clientid, createtime, validated, trusted, quoted, \
    signature, pcrlog, bioslog, imalog FROM report WHERE id = $1";
pub const DELETE_REPORT_BY_ID: &str = "DELETE FROM report WHERE id = $1";

pub const FIND_BASE_VALUES_BY_CLIENT_ID: &str = "SELECT id, createtime, name, enabled, verified, \
    trusted FROM base WHERE clientid = $1 ORDER BY createtime ASC";
pub const FIND_BASE_VALUE_BY_ID: &str = "SELECT id, clientid, createtime, name, enabled, \
    verified, trusted, pcr, bios, ima FROM base WHERE id = $1";
pub const FIND_ENABLED_BASE_VALUE_BY_CLIENT_ID: &str = "SELECT id, clientid, createtime, name, \
    enabled, verified, trusted, pcr, bios, ima FROM base \
    WHERE clientid = $1 AND enabled = true ORDER BY createtime DESC LIMIT 1";
pub const DELETE_BASE_VALUE_BY_ID: &str = "DELETE FROM base WHERE id = $1";
