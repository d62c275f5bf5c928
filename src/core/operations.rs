//! Named ledger operations, one per business action.
//!
//! Member, place and marketplace services call these instead of picking a reason
//! themselves, so the reason and its shape are fixed at the call site.

use crate::{
    core::{engine::Ledger, reason::Reason},
    entities::ledger_entry,
    errors::Result,
};

impl Ledger {
    /// Daily login bonus.
    pub async fn daily_credit(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.credit(wallet_id, amount, Reason::DailyCredit).await
    }

    /// Charges a member for a home.
    pub async fn home_purchase(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.debit(wallet_id, amount, Reason::HomePurchase).await
    }

    /// Returns the price of a home.
    pub async fn home_refund(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.credit(wallet_id, amount, Reason::HomeRefund).await
    }

    /// Weekly stipend for holding `role_id`.
    pub async fn weekly_role_credit(
        &self,
        wallet_id: i64,
        amount: f64,
        role_id: i64,
    ) -> Result<ledger_entry::Model> {
        self.credit(wallet_id, amount, Reason::WeeklyCredit { role_id })
            .await
    }

    /// Grant issued by the system.
    pub async fn system_credit(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.credit(wallet_id, amount, Reason::SystemToMember).await
    }

    /// Fee for listing a new object.
    pub async fn object_upload(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.debit(wallet_id, amount, Reason::ObjectUpload).await
    }

    /// Fee for restocking an object.
    pub async fn object_restock(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.debit(wallet_id, amount, Reason::ObjectRestock).await
    }

    /// Returns an upload fee.
    pub async fn object_upload_refund(
        &self,
        wallet_id: i64,
        amount: f64,
    ) -> Result<ledger_entry::Model> {
        self.credit(wallet_id, amount, Reason::ObjectUploadRefund)
            .await
    }

    /// Refunds instances of an object that never sold.
    pub async fn unsold_object_refund(
        &self,
        wallet_id: i64,
        amount: f64,
    ) -> Result<ledger_entry::Model> {
        self.credit(wallet_id, amount, Reason::ObjectUnsoldInstancesRefund)
            .await
    }

    /// Charges a buyer for an object bought from the system shop.
    pub async fn object_purchase(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.debit(wallet_id, amount, Reason::ObjectPurchase).await
    }

    /// Credits an object's creator with their profit.
    pub async fn object_profit(&self, wallet_id: i64, amount: f64) -> Result<ledger_entry::Model> {
        self.credit(wallet_id, amount, Reason::ObjectProfit).await
    }

    /// Marketplace sale: moves `amount` from the buyer to the seller.
    pub async fn object_sell(
        &self,
        buyer_wallet_id: i64,
        seller_wallet_id: i64,
        amount: f64,
    ) -> Result<ledger_entry::Model> {
        self.transfer(buyer_wallet_id, seller_wallet_id, amount, Reason::ObjectSell)
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use crate::core::history;
    use crate::entities::ReasonKind;
    use crate::errors::Result;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_marketplace_lifecycle() -> Result<()> {
        let ledger = setup_ledger().await?;
        let db = ledger.connection();
        let creator = create_test_wallet(db, 100.0).await?;
        let buyer = create_test_wallet(db, 100.0).await?;

        let upload = ledger.object_upload(creator.id, 25.0).await?;
        ledger.object_restock(creator.id, 5.0).await?;
        let sale = ledger.object_sell(buyer.id, creator.id, 40.0).await?;
        ledger.object_profit(creator.id, 4.0).await?;
        ledger.unsold_object_refund(creator.id, 3.0).await?;
        ledger.object_upload_refund(creator.id, 25.0).await?;
        ledger.object_purchase(buyer.id, 10.0).await?;

        assert_eq!(upload.reason, ReasonKind::ObjectUpload);
        assert_eq!(sale.reason, ReasonKind::ObjectSell);
        assert_eq!(sale.sender_wallet_id, Some(buyer.id));
        assert_eq!(sale.recipient_wallet_id, Some(creator.id));

        // 100 - 25 - 5 + 40 + 4 + 3 + 25
        assert_eq!(ledger.balance(creator.id).await?, 142.0);
        // 100 - 40 - 10
        assert_eq!(ledger.balance(buyer.id).await?, 50.0);
        assert_eq!(history::count_by_wallet(db, creator.id).await?, 6);
        assert_eq!(history::count_by_wallet(db, buyer.id).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_member_grants() -> Result<()> {
        let (ledger, wallet) = setup_with_wallet(0.0).await?;

        let daily = ledger.daily_credit(wallet.id, 50.0).await?;
        let stipend = ledger.weekly_role_credit(wallet.id, 200.0, 9).await?;
        let grant = ledger.system_credit(wallet.id, 1000.0).await?;
        ledger.home_purchase(wallet.id, 800.0).await?;
        ledger.home_refund(wallet.id, 800.0).await?;

        assert_eq!(daily.reason, ReasonKind::DailyCredit);
        assert_eq!(stipend.role_id, Some(9));
        assert_eq!(grant.reason, ReasonKind::SystemToMember);
        assert_eq!(ledger.balance(wallet.id).await?, 1250.0);

        Ok(())
    }
}
