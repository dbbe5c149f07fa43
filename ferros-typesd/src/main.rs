//! Type-description registry daemon.
//!
//! Loads every installed interface type description from the ament share
//! trees on `AMENT_PREFIX_PATH` and serves them over Zenoh: queries on
//! `@ros2_types/<type_name>` (wildcards welcome) are answered per matching
//! type, in the representation selected by the `format` query parameter.

mod descriptor;
mod registry;

use clap::Parser;
use ferros_core::DynError;
use ferros_zenoh::{Context, SessionConfig};
use registry::TypeRegistry;
use std::{path::PathBuf, str::FromStr};
use zenoh::{bytes::Encoding, key_expr::keyexpr, query::Query};

/// Hermetic key space the daemon answers on.
const QUERY_PREFIX: &str = "@ros2_types";

/// Representation selected by the `format` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ReplyFormat {
    /// The type description as JSON.
    #[default]
    TypeDescription,
    /// The type description with all referenced types, as JSON.
    FullTypeDescription,
    /// The original `.msg`/`.srv`/`.action` definition text.
    Definition,
    /// The concatenated schema for an MCAP recording.
    Mcap,
    /// The RIHS01 hash string.
    Hash,
    /// The path of the definition file.
    Path,
}

impl ReplyFormat {
    const VARIANTS: &'static [&'static str] = &[
        "typedescription",
        "fulltypedescription",
        "definition",
        "mcap",
        "hash",
        "path",
    ];
}

impl FromStr for ReplyFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "typedescription" => Ok(Self::TypeDescription),
            "fulltypedescription" => Ok(Self::FullTypeDescription),
            "definition" => Ok(Self::Definition),
            "mcap" => Ok(Self::Mcap),
            "hash" => Ok(Self::Hash),
            "path" => Ok(Self::Path),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ros2-typesd", version, about = "ROS2 type registry over Zenoh")]
struct Args {
    /// Zenoh endpoints to connect to, e.g. tcp/192.168.0.10:7447.
    #[arg(short = 'e', long = "connect", value_name = "ENDPOINT")]
    connect: Vec<String>,

    /// Path to a Zenoh configuration file.
    #[arg(short, long, env = "ZENOH_SESSION_CONFIG_URI")]
    config: Option<String>,

    /// ROS domain ID.
    #[arg(short, long, env = "ROS_DOMAIN_ID", default_value_t = 0)]
    domain_id: u32,
}

/// The `share` directory of every prefix on `AMENT_PREFIX_PATH`.
///
/// An unset or empty variable means there is no ROS environment to serve
/// types from; that is a startup failure.
fn ament_share_paths() -> Vec<PathBuf> {
    match std::env::var("AMENT_PREFIX_PATH") {
        Ok(value) if !value.is_empty() => value
            .split(':')
            .map(|prefix| {
                let mut path = PathBuf::from(prefix);
                path.push("share");
                path
            })
            .collect(),
        _ => {
            tracing::error!(
                "AMENT_PREFIX_PATH is not set or empty, is your ROS environment sourced?"
            );
            std::process::exit(1);
        }
    }
}

fn main() -> Result<(), DynError> {
    ferros_core::logging::init_logging();
    let args = Args::parse();

    let mut registry = TypeRegistry::new();
    for path in ament_share_paths() {
        registry.load_dir(&path);
    }
    tracing::info!("total types in registry: {}", registry.len());

    let ctx = Context::open(SessionConfig {
        domain_id: args.domain_id,
        config_uri: args.config,
        connect: args.connect,
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(&ctx, &registry))
}

async fn serve(ctx: &Context, registry: &TypeRegistry) -> Result<(), DynError> {
    let key = format!("{QUERY_PREFIX}/**");
    tracing::debug!("declaring queryable on '{key}'");
    let queryable = ctx.session().declare_queryable(&key).await?;

    tracing::info!("ready, listening for type queries");
    while let Ok(query) = queryable.recv_async().await {
        handle_query(registry, &query).await;
    }

    Ok(())
}

async fn handle_query(registry: &TypeRegistry, query: &Query) {
    tracing::debug!("received query: {}", query.key_expr());

    let format = match query.parameters().get("format") {
        Some(requested) => match requested.parse::<ReplyFormat>() {
            Ok(format) => format,
            Err(()) => {
                let message = format!(
                    "unknown format '{requested}' - accepted values are: {:?}",
                    ReplyFormat::VARIANTS
                );
                if let Err(e) = query.reply_err(message).await {
                    tracing::warn!("error replying to {}: {e}", query.key_expr());
                }
                return;
            }
        },
        None => ReplyFormat::default(),
    };

    let Some(pattern) = query
        .key_expr()
        .as_str()
        .strip_prefix(QUERY_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return;
    };
    let Ok(pattern) = keyexpr::new(pattern) else {
        return;
    };

    let matches = registry.matching(pattern);
    tracing::debug!("{} types match {pattern}", matches.len());

    for info in matches {
        let reply_key = format!("{QUERY_PREFIX}/{}", info.full_name);
        let result = match format {
            ReplyFormat::TypeDescription => {
                let payload = serde_json::to_string(
                    &info.description.type_description_msg.type_description,
                )
                .unwrap_or_else(|e| format!("failed to serialize type description: {e}"));
                query
                    .reply(reply_key, payload)
                    .encoding(Encoding::APPLICATION_JSON)
                    .await
            }
            ReplyFormat::FullTypeDescription => {
                let payload = serde_json::to_string(&info.description.type_description_msg)
                    .unwrap_or_else(|e| format!("failed to serialize type description: {e}"));
                query
                    .reply(reply_key, payload)
                    .encoding(Encoding::APPLICATION_JSON)
                    .await
            }
            ReplyFormat::Definition => {
                query
                    .reply(reply_key, info.definition_content.clone())
                    .encoding(Encoding::TEXT_PLAIN)
                    .await
            }
            ReplyFormat::Mcap => {
                query
                    .reply(reply_key, registry.mcap_schema(info))
                    .encoding(Encoding::TEXT_PLAIN)
                    .await
            }
            ReplyFormat::Hash => {
                query
                    .reply(reply_key, info.type_hash.clone())
                    .encoding(Encoding::TEXT_PLAIN)
                    .await
            }
            ReplyFormat::Path => {
                query
                    .reply(reply_key, info.definition_path.to_string_lossy().into_owned())
                    .encoding(Encoding::TEXT_PLAIN)
                    .await
            }
        };

        if let Err(e) = result {
            tracing::warn!("error replying to {}: {e}", query.key_expr());
        }
    }
}
