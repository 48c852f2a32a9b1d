use serde::Serialize;
use url::Url;

const TWITTER_BASE: &str = "https://twitter.com/intent/tweet";
const FACEBOOK_BASE: &str = "https://www.facebook.com/sharer/sharer.php";
const REDDIT_BASE: &str = "https://www.reddit.com/submit";

/// 文章页的分享链接和社交卡片信息
///
/// 链接在服务端一次性拼好，模板只负责输出；
/// 复制链接按钮的交互在主题的 site.js 里。
#[derive(Debug, Clone, Serialize)]
pub struct ShareLinks {
    pub page_url: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub twitter: String,
    pub facebook: String,
    pub reddit: String,
}

/// 在分享入口地址上追加查询参数，参数值做百分号编码
fn share_url(base: &str, params: &[(&str, &str)]) -> String {
    match Url::parse(base) {
        Ok(mut url) => {
            url.query_pairs_mut().extend_pairs(params);
            url.into()
        }
        Err(_) => base.to_string(),
    }
}

impl ShareLinks {
    pub fn build(
        page_url: &str,
        title: &str,
        description: Option<&str>,
        image: Option<&str>,
    ) -> Self {
        Self {
            page_url: page_url.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            image: image.map(str::to_string),
            twitter: share_url(TWITTER_BASE, &[("url", page_url), ("text", title)]),
            facebook: share_url(FACEBOOK_BASE, &[("u", page_url)]),
            reddit: share_url(REDDIT_BASE, &[("url", page_url), ("title", title)]),
        }
    }
}
