//! 管理控制台命令行入口

use std::sync::Arc;
use std::time::Duration;

use admin_console::{
    api::{DocumentApi, PermissionApi, RoleApi, WorkspaceApi, WorkspaceCache},
    config::AppConfig,
    models::PageQuery,
    notify::TracingNotifier,
    permission_tree::TreeWidget,
    storage::{FileTokenStore, MemoryTokenStore, TokenStore},
    telemetry, ApiClient, RoleEditor,
};
use secrecy::{ExposeSecret, Secret};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    let command = match args.get(1).map(String::as_str) {
        Some("--version") => {
            println!("admin-console {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--help") | None => {
            print_help();
            return Ok(());
        }
        Some(cmd @ ("roles" | "permissions" | "workspaces" | "documents")) => Command::parse(cmd, None)?,
        Some("role-permissions") => {
            let role_id = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("role-permissions requires a role id"))?
                .parse::<i64>()
                .map_err(|e| anyhow::anyhow!("Invalid role id: {}", e))?;
            Command::parse("role-permissions", Some(role_id))?
        }
        Some(other) => {
            eprintln!("未知参数: {}", other);
            print_help();
            std::process::exit(1);
        }
    };

    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("CONSOLE_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志与指标
    telemetry::init_telemetry(&config);
    telemetry::init_metrics();

    // 3. 构建客户端
    let tokens = build_token_store(&config)?;
    let client = Arc::new(ApiClient::from_config(
        &config,
        tokens,
        Arc::new(TracingNotifier),
    )?);

    tracing::info!(base_url = %client.base_url(), "Console client ready");

    // 4. 执行命令
    match command {
        Command::Roles => {
            let roles = RoleApi::new(client.clone()).list().await?;
            for role in roles {
                println!(
                    "{:>6}  {:<24} {:?}  {}",
                    role.id,
                    role.name,
                    role.status,
                    role.description.unwrap_or_default()
                );
            }
        }
        Command::Permissions => {
            let forest = PermissionApi::new(client.clone()).tree().await?;
            let editor = RoleEditor::open_new(forest);
            for widget in editor.widgets() {
                println!("[{}]", widget);
                print_nodes(editor.tree().nodes(widget), 1);
            }
        }
        Command::Workspaces => {
            let cache = Arc::new(WorkspaceCache::new(Duration::from_secs(
                config.workspace.cache_ttl_secs,
            )));
            let api = WorkspaceApi::new(client.clone(), cache);
            for ws in api.list(false).await? {
                let marker = if Some(ws.id) == config.workspace.current_id {
                    "*"
                } else {
                    " "
                };
                println!("{} {:>6}  {}", marker, ws.id, ws.name);
            }
        }
        Command::Documents => {
            let ctx = config.workspace.request_context();
            if ctx.workspace_id.is_none() {
                tracing::warn!("No current workspace configured, listing without workspace context");
            }
            let page = DocumentApi::new(client.clone())
                .list(&PageQuery::new(1, 20), ctx)
                .await?;
            for doc in page.items {
                println!("{:>6}  {}", doc.id, doc.title);
            }
        }
        Command::RolePermissions(role_id) => {
            let permissions = PermissionApi::new(client.clone());
            let roles = RoleApi::new(client.clone());
            let editor = RoleEditor::load(&permissions, &roles, Some(role_id)).await?;

            for widget in editor.widgets() {
                let view = editor.view(widget);
                println!("[{}] {} checked", widget, view.len());
                if widget == TreeWidget::System {
                    if let Some(home) = editor.home_id() {
                        println!("  home permission: {}", home);
                    }
                }
            }
            println!("grants: {:?}", editor.submission());
        }
    }

    Ok(())
}

enum Command {
    Roles,
    Permissions,
    Workspaces,
    Documents,
    RolePermissions(i64),
}

impl Command {
    fn parse(name: &str, role_id: Option<i64>) -> anyhow::Result<Self> {
        match (name, role_id) {
            ("roles", _) => Ok(Command::Roles),
            ("permissions", _) => Ok(Command::Permissions),
            ("workspaces", _) => Ok(Command::Workspaces),
            ("documents", _) => Ok(Command::Documents),
            ("role-permissions", Some(id)) => Ok(Command::RolePermissions(id)),
            _ => anyhow::bail!("Unsupported command: {}", name),
        }
    }
}

/// 配置了 token 文件时使用文件存储，否则使用内存存储
fn build_token_store(config: &AppConfig) -> anyhow::Result<Arc<dyn TokenStore>> {
    let preset = config
        .auth
        .token
        .as_ref()
        .map(|t| Secret::new(t.expose_secret().clone()));

    match config.auth.token_file.as_deref() {
        Some(path) => {
            let store = FileTokenStore::new(path);
            if let Some(token) = preset {
                store.save(token)?;
            }
            Ok(Arc::new(store))
        }
        None => {
            let store = MemoryTokenStore::new();
            if let Some(token) = preset {
                store.save(token)?;
            }
            Ok(Arc::new(store))
        }
    }
}

fn print_nodes(nodes: &[admin_console::models::permission::Permission], depth: usize) {
    for node in nodes {
        println!(
            "{}{:>6}  {:<32} {}",
            "  ".repeat(depth),
            node.id,
            node.code,
            node.page_path.as_deref().unwrap_or("-")
        );
        print_nodes(&node.children, depth + 1);
    }
}

/// 打印帮助信息
fn print_help() {
    println!("admin-console {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: admin-console <命令>");
    println!();
    println!("命令:");
    println!("  roles                    列出角色");
    println!("  permissions              按系统/工作空间打印权限树");
    println!("  workspaces               列出工作空间（* 为当前工作空间）");
    println!("  documents                列出当前工作空间的文档（第一页）");
    println!("  role-permissions <id>    显示角色的权限勾选情况与最终授权");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 CONSOLE_ 前缀的环境变量完成，例如");
    println!("  CONSOLE_API__BASE_URL, CONSOLE_AUTH__TOKEN, CONSOLE_WORKSPACE__CURRENT_ID");
}
