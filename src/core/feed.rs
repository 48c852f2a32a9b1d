use anyhow::Result;
use atom_syndication::{Entry, Feed, Text};
use chrono::Utc;
use rss::{Channel, Guid, Item};
use tracing::debug;

use crate::models::{Config, PostRecord};

/// Feed 默认收录的文章数量
pub const DEFAULT_FEED_LIMIT: usize = 20;

fn feed_limit(config: &Config) -> usize {
    config
        .feed
        .as_ref()
        .map(|f| f.limit)
        .unwrap_or(DEFAULT_FEED_LIMIT)
}

fn post_url(config: &Config, post: &PostRecord) -> String {
    format!(
        "{}/posts/{}",
        config.site_url().trim_end_matches('/'),
        post.slug
    )
}

/// 生成 RSS 2.0 输出，`posts` 应已按创建时间倒序排列
pub fn build_rss(config: &Config, posts: &[PostRecord]) -> Result<String> {
    let mut channel = Channel::default();
    channel.set_title(config.title.clone());
    channel.set_link(config.site_url());
    channel.set_description(config.description.clone().unwrap_or_default());
    channel.set_language(Some(config.language()));

    for post in posts.iter().take(feed_limit(config)) {
        let mut item = Item::default();
        item.set_title(post.title.clone());
        let url = post_url(config, post);
        item.set_link(url.clone());
        item.set_guid(Guid {
            value: url,
            permalink: true,
        });
        item.set_pub_date(post.created_at.to_rfc2822());
        item.set_description(post.excerpt.clone().unwrap_or_default());

        channel.items.push(item);
    }

    debug!("RSS feed 收录 {} 篇文章", channel.items.len());
    Ok(channel.to_string())
}

/// 生成 Atom 输出，`posts` 应已按创建时间倒序排列
pub fn build_atom(config: &Config, posts: &[PostRecord]) -> Result<String> {
    let mut feed = Feed::default();
    feed.set_title(config.title.clone());
    feed.set_id(config.site_url());
    feed.set_updated(Utc::now());

    if let Some(subtitle) = &config.subtitle {
        feed.set_subtitle(Text::plain(subtitle.clone()));
    }
    feed.set_lang(Some(config.language()));

    for post in posts.iter().take(feed_limit(config)) {
        let mut entry = Entry::default();
        let url = post_url(config, post);
        entry.set_id(url.clone());
        entry.set_title(Text::plain(post.title.clone()));

        let mut link = atom_syndication::Link::default();
        link.set_href(url);
        link.set_rel("alternate".to_string());
        entry.set_links(vec![link]);

        entry.set_updated(post.updated_at.fixed_offset());
        entry.set_published(Some(post.created_at.fixed_offset()));
        entry.set_summary(Text::plain(post.excerpt.clone().unwrap_or_default()));

        feed.entries.push(entry);
    }

    debug!("Atom feed 收录 {} 篇文章", feed.entries.len());
    Ok(feed.to_string())
}
