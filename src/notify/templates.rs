//! 审核结果邮件模板
//!
//! 站点面向法语用户，邮件正文使用法语。

use serde::{Deserialize, Serialize};

/// 通知类型（每种终态转换对应一个模板）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Published,
    Rejected,
    RevisionApproved,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Published => "published",
            NotificationKind::Rejected => "rejected",
            NotificationKind::RevisionApproved => "revision_approved",
        }
    }
}

/// 模板变量
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub developer_name: String,
    pub game_name: String,
    pub site_name: String,
    pub game_url: Option<String>,
    pub reason: Option<String>,
}

/// 渲染后的邮件主题与正文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

pub fn render(kind: NotificationKind, ctx: &TemplateContext) -> RenderedEmail {
    let site = if ctx.site_name.trim().is_empty() {
        "Sisme Games"
    } else {
        ctx.site_name.trim()
    };

    let mut body = format!("Bonjour {},\n\n", ctx.developer_name);

    let subject = match kind {
        NotificationKind::Published => {
            body.push_str(&format!(
                "Bonne nouvelle : votre jeu « {} » a été approuvé et est maintenant publié sur {}.\n",
                ctx.game_name, site
            ));
            if let Some(url) = &ctx.game_url {
                body.push_str(&format!("Vous pouvez le consulter ici : {}\n", url));
            }
            format!("[{}] Votre jeu « {} » est publié", site, ctx.game_name)
        }
        NotificationKind::Rejected => {
            body.push_str(&format!(
                "Votre soumission « {} » n'a pas été retenue en l'état et repasse en brouillon.\n",
                ctx.game_name
            ));
            if let Some(reason) = ctx.reason.as_deref().filter(|r| !r.trim().is_empty()) {
                body.push_str(&format!("\nMotif : {}\n", reason.trim()));
            }
            body.push_str("\nVous pouvez la modifier puis la soumettre à nouveau.\n");
            format!("[{}] Votre soumission « {} » nécessite des modifications", site, ctx.game_name)
        }
        NotificationKind::RevisionApproved => {
            body.push_str(&format!(
                "Les modifications proposées pour « {} » ont été approuvées et sont en ligne.\n",
                ctx.game_name
            ));
            if let Some(url) = &ctx.game_url {
                body.push_str(&format!("Fiche du jeu : {}\n", url));
            }
            format!("[{}] Mise à jour de « {} » approuvée", site, ctx.game_name)
        }
    };

    body.push_str(&format!("\nL'équipe {}\n", site));
    RenderedEmail { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext {
        TemplateContext {
            developer_name: "Camille".into(),
            game_name: "Hollow Path".into(),
            site_name: "Sisme Games".into(),
            game_url: Some("https://games.sisme.fr/hollow-path/".into()),
            reason: Some("Captures d'écran manquantes".into()),
        }
    }

    #[test]
    fn published_mail_addresses_the_developer_and_links_the_game() {
        let mail = render(NotificationKind::Published, &ctx());
        assert!(mail.subject.contains("Hollow Path"));
        assert!(mail.body.starts_with("Bonjour Camille"));
        assert!(mail.body.contains("https://games.sisme.fr/hollow-path/"));
        assert!(!mail.body.contains("Motif"));
    }

    #[test]
    fn rejected_mail_carries_the_reason() {
        let mail = render(NotificationKind::Rejected, &ctx());
        assert!(mail.body.contains("Motif : Captures d'écran manquantes"));
    }

    #[test]
    fn blank_site_name_falls_back_to_default_signature() {
        let mut c = ctx();
        c.site_name = String::new();
        let mail = render(NotificationKind::RevisionApproved, &c);
        assert!(mail.subject.starts_with("[Sisme Games]"));
    }
}
