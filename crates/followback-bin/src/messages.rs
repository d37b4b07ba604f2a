//! Localized user-facing text, keyed like the engine's phase message keys.

use followback_config_and_utils::Lang;

const EN: &[(&str, &str)] = &[
    ("message.blank", ""),
    ("message.loginInProgress", "Logging in..."),
    (
        "message.loginFailed",
        "Login failed. Check your handle and app password.",
    ),
    ("message.fetchingFollowers", "Fetching followers..."),
    ("message.fetchedFollowers", "Fetched followers."),
    ("message.fetchFollowersFailed", "Failed to fetch followers."),
    ("message.followingBack", "Following back..."),
    ("message.followedBack", "Followed back."),
    ("text.numNotFollowing", "Followers you don't follow back:"),
    ("text.alreadyFollowing", "Followers you follow back:"),
    ("text.mutedFollowers", "Muted followers skipped:"),
    (
        "text.alreadyFollowingAll",
        "You already follow back all your followers.",
    ),
    ("text.followFailed", "Could not follow:"),
    ("text.notLoggedIn", "Not logged in."),
    (
        "text.sessionExpired",
        "Your saved session has expired. Please log in again.",
    ),
    ("text.followed", "Followed"),
    ("text.failed", "Failed"),
    ("text.remaining", "Remaining"),
    ("ui.confirmFollowAll", "Follow back these accounts?"),
    ("ui.cancelled", "Cancelled."),
];

const JA: &[(&str, &str)] = &[
    ("message.blank", ""),
    ("message.loginInProgress", "ログイン中..."),
    (
        "message.loginFailed",
        "ログインに失敗しました。ハンドルとアプリパスワードを確認してください。",
    ),
    ("message.fetchingFollowers", "フォロワーを取得中..."),
    ("message.fetchedFollowers", "フォロワーを取得しました。"),
    ("message.fetchFollowersFailed", "フォロワーの取得に失敗しました。"),
    ("message.followingBack", "フォローバック中..."),
    ("message.followedBack", "フォローバックしました。"),
    ("text.numNotFollowing", "フォローバックしていないフォロワー:"),
    ("text.alreadyFollowing", "フォローバック済みのフォロワー:"),
    ("text.mutedFollowers", "スキップしたミュート中のフォロワー:"),
    (
        "text.alreadyFollowingAll",
        "すべてのフォロワーをフォローバック済みです。",
    ),
    ("text.followFailed", "フォローできませんでした:"),
    ("text.notLoggedIn", "ログインしていません。"),
    (
        "text.sessionExpired",
        "保存されたセッションの有効期限が切れました。もう一度ログインしてください。",
    ),
    ("text.followed", "フォロー済み"),
    ("text.failed", "失敗"),
    ("text.remaining", "残り"),
    ("ui.confirmFollowAll", "これらのアカウントをフォローバックしますか?"),
    ("ui.cancelled", "キャンセルしました。"),
];

fn table(lang: Lang) -> &'static [(&'static str, &'static str)] {
    match lang {
        Lang::En => EN,
        Lang::Ja => JA,
    }
}

/// Text for `key` in `lang`, falling back to English, then to the key itself.
pub fn text<'a>(lang: Lang, key: &'a str) -> &'a str {
    let lookup = |entries: &'static [(&'static str, &'static str)]| {
        entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    };
    lookup(table(lang)).or_else(|| lookup(EN)).unwrap_or(key)
}
