use core_types::GroupLabel;

/// A catalog query name together with the number of columns its rows carry.
///
/// Column meaning is positional; each decoder in the aggregation engine
/// relies on the order documented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: &'static str,
    pub arity: usize,
}

/// `product_name, total_cents`
pub const PRODUCT_SALES: NamedQuery = NamedQuery { name: "product_sales_summary", arity: 2 };
/// `event_id, total_cents`
pub const EVENT_SALES: NamedQuery = NamedQuery { name: "event_sales_summary", arity: 2 };
/// `group_label ('A'..'D' | 'Unknown'), total_cents`
pub const GROUP_SALES: NamedQuery = NamedQuery { name: "group_sales_summary", arity: 2 };
/// Label `group_sales_summary` gives sales of users with no assignment.
pub const UNASSIGNED_LABEL: &str = "Unknown";
/// `amount_cents`, one row per sale
pub const GROUP_A_AMOUNTS: NamedQuery = NamedQuery { name: "group_a_amounts", arity: 1 };
pub const GROUP_B_AMOUNTS: NamedQuery = NamedQuery { name: "group_b_amounts", arity: 1 };
pub const GROUP_C_AMOUNTS: NamedQuery = NamedQuery { name: "group_c_amounts", arity: 1 };
pub const GROUP_D_AMOUNTS: NamedQuery = NamedQuery { name: "group_d_amounts", arity: 1 };
/// `month (YYYY-MM), purchases, total_cents`
pub const MONTHLY_PURCHASES: NamedQuery = NamedQuery { name: "monthly_purchases", arity: 3 };
/// `ui_change, desc_change, purchases, total_cents`
pub const VARIANT_AVERAGES: NamedQuery = NamedQuery { name: "avg_purchase_by_ui_and_desc", arity: 4 };
/// `product_name, ui_change, desc_change, purchases, total_cents`
pub const PRODUCT_VARIANT_AVERAGES: NamedQuery =
    NamedQuery { name: "avg_purchase_by_product_ui_desc", arity: 5 };

/// Every query the report depends on, checked once at startup.
pub const ALL_QUERIES: [NamedQuery; 10] = [
    PRODUCT_SALES,
    EVENT_SALES,
    GROUP_SALES,
    GROUP_A_AMOUNTS,
    GROUP_B_AMOUNTS,
    GROUP_C_AMOUNTS,
    GROUP_D_AMOUNTS,
    MONTHLY_PURCHASES,
    VARIANT_AVERAGES,
    PRODUCT_VARIANT_AVERAGES,
];

pub fn group_amounts(group: GroupLabel) -> NamedQuery {
    match group {
        GroupLabel::A => GROUP_A_AMOUNTS,
        GroupLabel::B => GROUP_B_AMOUNTS,
        GroupLabel::C => GROUP_C_AMOUNTS,
        GroupLabel::D => GROUP_D_AMOUNTS,
    }
}
