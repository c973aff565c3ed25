//! Relationship activity
//!
//! Creative and destructive actions of members, the source for quests

/// Kind of recorded activity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "activity_kind_type", rename_all = "kebab-case")]
pub enum ActivityKind {
    /// Relationship is created
    CreateRelationship,

    /// Someone is invited
    InviteMember,

    /// Someone joined
    JoinRelationship,

    /// Coupon is issued
    CreateCoupon,

    /// Coupon is redeemed
    RedeemCoupon,

    /// Coupon is deleted
    DeleteCoupon,

    /// Scrapbook is created
    CreateScrapbook,

    /// Scrapbook or its details are updated
    UpdateScrapbook,

    /// Scrapbook is deleted
    DeleteScrapbook,

    /// Page is created
    CreatePage,

    /// Page details are updated
    UpdatePage,

    /// Page is deleted
    DeletePage,

    /// Photo is placed
    CreateMedia,

    /// Photo is moved
    UpdateMedia,

    /// Photo is removed
    DeleteMedia,

    /// Sticker is placed
    CreateSticker,

    /// Sticker is changed
    UpdateSticker,

    /// Sticker is removed
    DeleteSticker,

    /// Text is placed
    CreateText,

    /// Text is changed
    UpdateText,

    /// Text is removed
    DeleteText,

    /// Note is placed
    CreateNote,

    /// Note is changed
    UpdateNote,

    /// Note is removed
    DeleteNote,
}
